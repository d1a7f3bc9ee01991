//! Strongly typed identifiers passed through to the identity provider and reporting API.
//!
//! Identifiers are opaque: the relay only checks that a value is present (non-blank) and
//! never validates its format. Upstream services own that decision. The one exception is
//! `.` and `..`, which URL path normalization would drop instead of encoding.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after the presence check.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty or whitespace.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (tenant, client, group, report).
		kind: &'static str,
	},
	/// The identifier is a relative path segment.
	#[error("{kind} identifier cannot be `.` or `..`.")]
	DotSegment {
		/// Kind of identifier (tenant, client, group, report).
		kind: &'static str,
	},
}

def_id! { TenantId, "Directory (tenant) identifier addressed at the identity provider.", "Tenant" }
def_id! { ClientId, "Service-principal application (client) identifier.", "Client" }
def_id! { GroupId, "Workspace (group) identifier in the reporting platform.", "Group" }
def_id! { ReportId, "Report identifier inside a workspace.", "Report" }

impl TenantId {
	/// Multi-tenant authority segment used when the relay authenticates with its own
	/// service principal.
	pub const COMMON: &'static str = "common";

	/// Returns the shared `common` tenant.
	pub fn common() -> Self {
		Self(Self::COMMON.to_owned())
	}
}

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.trim().is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if matches!(view, "." | "..") {
		return Err(IdentifierError::DotSegment { kind });
	}

	Ok(())
}
