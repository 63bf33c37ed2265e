//! Unlisted share tokens and share links
//!
//! A token is 32 characters drawn uniformly from `[A-Za-z0-9]`. Tokens are
//! generated client-side with a non-cryptographic RNG; uniqueness is left to
//! the backend.
//!
//! Share links use hash routing and are the only wire-visible path scheme:
//! `<origin>/#/mod/<id>` and `<origin>/#/character/<id>`.

use crate::types::UnlistedId;
use rand::distr::Alphanumeric;
use rand::Rng;

/// Token length in characters
pub const UNLISTED_ID_LEN: usize = 32;

/// The 62 symbols a token may contain
pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a fresh token with the thread-local RNG
#[must_use]
pub fn generate_unlisted_id() -> UnlistedId {
    generate_unlisted_id_with(&mut rand::rng())
}

/// Generate a token from the given random source
#[must_use]
pub fn generate_unlisted_id_with<R: Rng + ?Sized>(rng: &mut R) -> UnlistedId {
    let token: String = (0..UNLISTED_ID_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect();
    UnlistedId::from_generated(token)
}

/// Resource kind addressed by a share link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShareKind {
    /// Published mod
    Mod,
    /// Character showcase
    Character,
}

impl ShareKind {
    /// Route segment after `#/`
    #[inline]
    #[must_use]
    pub fn segment(&self) -> &'static str {
        match self {
            ShareKind::Mod => "mod",
            ShareKind::Character => "character",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "mod" => Some(ShareKind::Mod),
            "character" => Some(ShareKind::Character),
            _ => None,
        }
    }
}

fn link(origin: &str, kind: ShareKind, id: &UnlistedId) -> String {
    format!("{}/#/{}/{}", origin.trim_end_matches('/'), kind.segment(), id)
}

/// Share link of a mod
#[must_use]
pub fn share_url(origin: &str, id: &UnlistedId) -> String {
    link(origin, ShareKind::Mod, id)
}

/// Share link of a character showcase
#[must_use]
pub fn character_share_url(origin: &str, id: &UnlistedId) -> String {
    link(origin, ShareKind::Character, id)
}

/// Recover the kind and token from a share link
///
/// Accepts full URLs and bare `#/kind/id` fragments.
#[must_use]
pub fn parse_share_url(url: &str) -> Option<(ShareKind, UnlistedId)> {
    let (_, route) = url.split_once("#/")?;
    let (segment, rest) = route.split_once('/')?;
    let kind = ShareKind::from_segment(segment)?;
    let token = rest.split(['?', '/']).next()?;
    Some((kind, token.parse().ok()?))
}
