use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::{GameId, ParticipantId, SessionId, UserId};
use crate::identity::HasLedgerIdentity;

/// A registered user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

impl User {
    pub const MIN_NAME_LEN: usize = 3;
    pub const MAX_NAME_LEN: usize = 12;

    /// Trim and lower-case a user name, rejecting names outside 3-12 characters.
    pub fn normalize_name(name: &str) -> Result<String, TypeError> {
        let name = name.trim().to_lowercase();
        check_len("user name", &name, Self::MIN_NAME_LEN, Self::MAX_NAME_LEN)?;
        Ok(name)
    }
}

impl HasLedgerIdentity for User {
    fn ledger_identity(&self) -> UserId {
        self.id
    }
}

/// A catalogue game that game sessions refer to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub name: String,
}

impl Game {
    pub const MIN_NAME_LEN: usize = 2;
    pub const MAX_NAME_LEN: usize = 12;

    /// Trim a game name, rejecting names outside 2-12 characters.
    pub fn normalize_name(name: &str) -> Result<String, TypeError> {
        let name = name.trim().to_string();
        check_len("game name", &name, Self::MIN_NAME_LEN, Self::MAX_NAME_LEN)?;
        Ok(name)
    }
}

/// Membership of a user in a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub session_id: SessionId,
    pub user_id: UserId,
}

impl HasLedgerIdentity for Participant {
    fn ledger_identity(&self) -> UserId {
        self.user_id
    }
}

fn check_len(field: &'static str, value: &str, min: usize, max: usize) -> Result<(), TypeError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(TypeError::InvalidName {
            field,
            reason: format!("must be between {min}-{max} characters, got {len}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_name_is_lowercased_and_trimmed() {
        assert_eq!(User::normalize_name("  Alice ").unwrap(), "alice");
    }

    #[test]
    fn user_name_length_bounds() {
        assert!(User::normalize_name("ab").is_err());
        assert!(User::normalize_name("abc").is_ok());
        assert!(User::normalize_name("abcdefghijkl").is_ok());
        assert!(User::normalize_name("abcdefghijklm").is_err());
    }

    #[test]
    fn game_name_keeps_case() {
        assert_eq!(Game::normalize_name("Poker").unwrap(), "Poker");
        assert!(Game::normalize_name("P").is_err());
    }

    #[test]
    fn ledger_identity_of_participant_is_its_user() {
        let p = Participant {
            id: ParticipantId::new(1),
            session_id: SessionId::new(2),
            user_id: UserId::new(9),
        };
        assert_eq!(p.ledger_identity(), UserId::new(9));

        let u = User { id: UserId::new(4), name: "bob".into() };
        assert_eq!(u.ledger_identity(), UserId::new(4));
        assert_eq!((&u).ledger_identity(), UserId::new(4));
    }

    #[test]
    fn participant_serializes_camel_case() {
        let p = Participant {
            id: ParticipantId::new(1),
            session_id: SessionId::new(2),
            user_id: UserId::new(3),
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["sessionId"], 2);
        assert_eq!(json["userId"], 3);
    }
}
