//! In-memory session state and its pure transitions.
//!
//! `Session::transition` computes the next session from the current one and
//! an event, and reports the storage effect the caller must apply. It never
//! touches storage itself.

use crate::models::User;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    user: Option<User>,
    token: Option<String>,
}

/// A mutation applied to a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    TokenSet(Option<String>),
    UserSet(Option<User>),
    LoggedOut,
}

/// What the persisted credential record must do to mirror a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageEffect {
    Write(String),
    Remove,
    Nothing,
}

/// Treat empty tokens as no token at all.
fn normalize(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

impl Session {
    /// Session restored from a persisted token. The user is never persisted.
    pub fn hydrated(stored: Option<String>) -> Self {
        Self {
            user: None,
            token: normalize(stored),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Derived from the token on every read; there is no separate flag.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn transition(&self, event: SessionEvent) -> (Session, StorageEffect) {
        match event {
            SessionEvent::TokenSet(token) => {
                let token = normalize(token);
                let effect = match token {
                    Some(ref t) => StorageEffect::Write(t.clone()),
                    None => StorageEffect::Remove,
                };
                let next = Session {
                    user: self.user.clone(),
                    token,
                };
                (next, effect)
            }
            SessionEvent::UserSet(user) => {
                let next = Session {
                    user,
                    token: self.token.clone(),
                };
                (next, StorageEffect::Nothing)
            }
            SessionEvent::LoggedOut => (Session::default(), StorageEffect::Remove),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_all(events: Vec<SessionEvent>) -> Session {
        events
            .into_iter()
            .fold(Session::default(), |session, event| session.transition(event).0)
    }

    #[test]
    fn test_initial_state() {
        let session = Session::default();
        assert!(session.user().is_none());
        assert!(session.token().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_token_set_writes_storage() {
        let (next, effect) = Session::default().transition(SessionEvent::TokenSet(Some("abc".to_string())));

        assert_eq!(next.token(), Some("abc"));
        assert!(next.is_authenticated());
        assert_eq!(effect, StorageEffect::Write("abc".to_string()));
    }

    #[test]
    fn test_token_cleared_removes_storage() {
        let (session, _) = Session::default().transition(SessionEvent::TokenSet(Some("abc".to_string())));
        let (next, effect) = session.transition(SessionEvent::TokenSet(None));

        assert_eq!(next.token(), None);
        assert!(!next.is_authenticated());
        assert_eq!(effect, StorageEffect::Remove);
    }

    #[test]
    fn test_empty_token_is_not_authenticated() {
        let (next, effect) = Session::default().transition(SessionEvent::TokenSet(Some(String::new())));

        assert_eq!(next.token(), None);
        assert!(!next.is_authenticated());
        assert_eq!(effect, StorageEffect::Remove);
    }

    #[test]
    fn test_authenticated_tracks_last_token() {
        let sequences: Vec<Vec<Option<&str>>> = vec![
            vec![Some("a")],
            vec![Some("a"), None],
            vec![None, Some("b")],
            vec![Some("a"), Some(""), Some("c")],
            vec![Some("a"), Some("b"), Some("")],
            vec![],
        ];

        for tokens in sequences {
            let expected = matches!(tokens.last(), Some(Some(t)) if !t.is_empty());
            let events = tokens
                .iter()
                .map(|t| SessionEvent::TokenSet(t.map(str::to_string)))
                .collect();
            let session = apply_all(events);
            assert_eq!(session.is_authenticated(), expected, "sequence {:?}", tokens);
        }
    }

    #[test]
    fn test_user_set_is_independent_of_token() {
        let user = User::new(1, "testuser");
        let (next, effect) = Session::default().transition(SessionEvent::UserSet(Some(user.clone())));

        assert_eq!(next.user(), Some(&user));
        assert!(!next.is_authenticated());
        assert_eq!(effect, StorageEffect::Nothing);
    }

    #[test]
    fn test_logout_resets_everything() {
        let session = apply_all(vec![
            SessionEvent::UserSet(Some(User::new(1, "testuser"))),
            SessionEvent::TokenSet(Some("test-token".to_string())),
        ]);
        let (next, effect) = session.transition(SessionEvent::LoggedOut);

        assert_eq!(next, Session::default());
        assert_eq!(effect, StorageEffect::Remove);

        // Idempotent
        let (again, effect) = next.transition(SessionEvent::LoggedOut);
        assert_eq!(again, Session::default());
        assert_eq!(effect, StorageEffect::Remove);
    }

    #[test]
    fn test_hydrated() {
        let session = Session::hydrated(Some("xyz".to_string()));
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("xyz"));
        assert!(session.user().is_none());

        assert!(!Session::hydrated(Some(String::new())).is_authenticated());
        assert!(!Session::hydrated(None).is_authenticated());
    }
}
