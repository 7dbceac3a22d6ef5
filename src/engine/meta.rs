use crate::errors::ValidationError;
use schema::OwnershipRecord;
use serde::{Deserialize, Deserializer};

pub const MAX_NICKNAME_LENGTH: usize = 50;

/// Owner-editable fields of a record.
///
/// `nickname` is three-state: absent keeps the current value, `null` clears it
/// and a string replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaUpdate {
    #[serde(default, deserialize_with = "deserialize_some")]
    pub nickname: Option<Option<String>>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

/// Deserialize a present field (even `null`) as `Some`, leaving `None` for absent fields
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

pub fn validate_nickname(nickname: Option<&str>) -> Result<(), ValidationError> {
    let length = nickname.map_or(0, |name| name.chars().count());
    if length > MAX_NICKNAME_LENGTH {
        return Err(ValidationError::NicknameTooLong {
            length,
            max: MAX_NICKNAME_LENGTH,
        });
    }
    Ok(())
}

impl MetaUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.nickname {
            Some(nickname) => validate_nickname(nickname.as_deref()),
            None => Ok(()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nickname.is_none() && self.is_favorite.is_none()
    }

    /// Write the supplied fields onto `record`
    pub fn apply(&self, record: &mut OwnershipRecord) {
        if let Some(nickname) = &self.nickname {
            record.nickname = nickname.clone();
        }
        if let Some(is_favorite) = self.is_favorite {
            record.is_favorite = is_favorite;
        }
    }
}
