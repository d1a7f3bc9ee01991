// self
use crate::{
	_prelude::*,
	provider::{
		DEFAULT_AUTHORITY, DEFAULT_REPORTING_API, DEFAULT_SCOPE, ServiceDescriptor,
		ServiceEndpoints,
	},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ServiceDescriptorError {
	/// A default endpoint constant failed to parse.
	#[error("The default {endpoint} endpoint is invalid.")]
	InvalidDefault {
		/// Which endpoint failed to parse.
		endpoint: &'static str,
	},
	/// Endpoints must use HTTPS (plain HTTP is tolerated for loopback hosts only).
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Endpoints must accept appended path segments.
	#[error("The {endpoint} endpoint cannot be used as a base URL: {url}.")]
	NotABase {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Endpoints must not carry query strings or fragments.
	#[error("The {endpoint} endpoint must not include a query or fragment: {url}.")]
	UnexpectedQuery {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Scope must be non-blank.
	#[error("Scope cannot be empty.")]
	EmptyScope,
}

/// Builder for [`ServiceDescriptor`] values.
#[derive(Debug, Default)]
pub struct ServiceDescriptorBuilder {
	/// Identity authority override (defaults to [`DEFAULT_AUTHORITY`]).
	pub authority: Option<Url>,
	/// Reporting API override (defaults to [`DEFAULT_REPORTING_API`]).
	pub reporting_api: Option<Url>,
	/// Scope override (defaults to [`DEFAULT_SCOPE`]).
	pub scope: Option<String>,
}
impl ServiceDescriptorBuilder {
	/// Sets the identity authority.
	pub fn authority(mut self, url: Url) -> Self {
		self.authority = Some(url);

		self
	}

	/// Sets the reporting API base.
	pub fn reporting_api(mut self, url: Url) -> Self {
		self.reporting_api = Some(url);

		self
	}

	/// Sets the scope requested during the client-credentials grant.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ServiceDescriptor, ServiceDescriptorError> {
		let authority = match self.authority {
			Some(url) => url,
			None => parse_default("authority", DEFAULT_AUTHORITY)?,
		};
		let reporting_api = match self.reporting_api {
			Some(url) => url,
			None => parse_default("reporting API", DEFAULT_REPORTING_API)?,
		};
		let scope = self.scope.unwrap_or_else(|| DEFAULT_SCOPE.to_owned());
		let descriptor =
			ServiceDescriptor { endpoints: ServiceEndpoints { authority, reporting_api }, scope };

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ServiceDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ServiceDescriptorError> {
		validate_endpoint("authority", &self.endpoints.authority)?;
		validate_endpoint("reporting API", &self.endpoints.reporting_api)?;

		if self.scope.trim().is_empty() {
			return Err(ServiceDescriptorError::EmptyScope);
		}

		Ok(())
	}
}

fn parse_default(endpoint: &'static str, raw: &str) -> Result<Url, ServiceDescriptorError> {
	Url::parse(raw).map_err(|_| ServiceDescriptorError::InvalidDefault { endpoint })
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ServiceDescriptorError> {
	let secure = url.scheme() == "https" || (url.scheme() == "http" && is_loopback(url));

	if !secure {
		return Err(ServiceDescriptorError::InsecureEndpoint {
			endpoint: name,
			url: url.to_string(),
		});
	}
	if url.cannot_be_a_base() {
		return Err(ServiceDescriptorError::NotABase { endpoint: name, url: url.to_string() });
	}
	if url.query().is_some() || url.fragment().is_some() {
		return Err(ServiceDescriptorError::UnexpectedQuery {
			endpoint: name,
			url: url.to_string(),
		});
	}

	Ok(())
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(addr)) => addr.is_loopback(),
		Some(url::Host::Ipv6(addr)) => addr.is_loopback(),
		None => false,
	}
}
