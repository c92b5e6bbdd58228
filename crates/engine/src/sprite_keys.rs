use thiserror::Error;

/// Sprite keys resolve to `assets/base/sprites/<key>.png`, so they must stay
/// inside that directory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("sprite key is empty")]
    Empty,
    #[error("sprite key '{key}' is absolute")]
    Absolute { key: String },
    #[error("sprite key '{key}' has an empty path segment")]
    EmptySegment { key: String },
    #[error("sprite key '{key}' walks out of the sprite directory")]
    ParentTraversal { key: String },
    #[error("sprite key '{key}' contains '{character}'; use a-z, 0-9, '_', '-' and '/'")]
    InvalidCharacter { key: String, character: char },
}

pub(crate) fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    if key.is_empty() {
        return Err(SpriteKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(SpriteKeyError::Absolute {
            key: key.to_string(),
        });
    }
    if let Some(character) = key
        .chars()
        .find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '-' | '/' | '.')))
    {
        return Err(SpriteKeyError::InvalidCharacter {
            key: key.to_string(),
            character,
        });
    }
    for segment in key.split('/') {
        match segment {
            "" => {
                return Err(SpriteKeyError::EmptySegment {
                    key: key.to_string(),
                })
            }
            _ if segment.contains("..") => {
                return Err(SpriteKeyError::ParentTraversal {
                    key: key.to_string(),
                })
            }
            _ if segment.contains('.') => {
                return Err(SpriteKeyError::InvalidCharacter {
                    key: key.to_string(),
                    character: '.',
                })
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_nested_lowercase_keys() {
        for key in ["player", "props/trash_can", "npc/guard-2"] {
            assert_eq!(validate_sprite_key(key), Ok(()), "key={key}");
        }
    }

    #[test]
    fn rejects_keys_that_escape_or_misname() {
        assert_eq!(validate_sprite_key(""), Err(SpriteKeyError::Empty));
        assert!(matches!(
            validate_sprite_key("/abs"),
            Err(SpriteKeyError::Absolute { .. })
        ));
        assert!(matches!(
            validate_sprite_key("props//can"),
            Err(SpriteKeyError::EmptySegment { .. })
        ));
        assert!(matches!(
            validate_sprite_key("props/../../etc"),
            Err(SpriteKeyError::ParentTraversal { .. })
        ));
        assert!(matches!(
            validate_sprite_key("Horn"),
            Err(SpriteKeyError::InvalidCharacter { character: 'H', .. })
        ));
        assert!(matches!(
            validate_sprite_key(r"props\can"),
            Err(SpriteKeyError::InvalidCharacter { character: '\\', .. })
        ));
        assert!(validate_sprite_key("horn.png").is_err());
    }
}
