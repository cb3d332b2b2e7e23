//! Signature-agnostic JWT payload inspection.
//!
//! [`decode`] answers "what does this token claim", never "is this token valid". Malformed
//! input is a legitimate decoded-to-nothing state, so every failure collapses into `None`.

// crates.io
use base64::{
	Engine,
	alphabet,
	engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde::Deserializer;
// self
use crate::_prelude::*;

// Base64url with optional padding; token issuers disagree on whether to pad.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
	&alphabet::URL_SAFE,
	GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Claims without a typed projection.
pub type RawClaims = serde_json::Map<String, serde_json::Value>;

/// Decoded JWT payload: the registered expiry plus caller-defined claims.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(bound(deserialize = "C: DeserializeOwned"))]
pub struct JwtPayload<C = RawClaims> {
	/// Expiry in seconds since the Unix epoch (`exp`).
	#[serde(default, deserialize_with = "unix_seconds")]
	pub exp: Option<i64>,
	/// Remaining claims.
	#[serde(flatten)]
	pub claims: C,
}
impl<C> JwtPayload<C> {
	/// Returns the expiry instant, if the token carries a representable one.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.exp.and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
	}

	/// Returns `true` once `instant` reaches the expiry; tokens without one never expire.
	///
	/// Compares raw epoch seconds, so expiries beyond the representable calendar range still
	/// count as future.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.exp.is_some_and(|exp| instant.unix_timestamp() >= exp)
	}

	/// Convenience helper that checks expiry against the current UTC instant.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}

/// Decodes the payload segment of `token` without verifying its signature.
pub fn decode<C>(token: &str) -> Option<JwtPayload<C>>
where
	C: DeserializeOwned,
{
	let segment = token.split('.').nth(1).filter(|segment| !segment.is_empty())?;
	let bytes = PAYLOAD_ENGINE.decode(segment).ok()?;
	let text = String::from_utf8(bytes).ok()?;

	serde_json::from_str(&text).ok()
}

fn unix_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<serde_json::Number>::deserialize(deserializer)?;

	Ok(value.and_then(|number| {
		number.as_i64().or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
	}))
}
