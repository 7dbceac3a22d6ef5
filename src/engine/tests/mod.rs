mod common;




#[cfg(test)]
mod test_battle;





#[cfg(test)]
mod test_invariants;
