//! Cloud provider profiles
//!
//! A [`ProviderProfile`] is chosen once per run and determines the discovery
//! command dialect, its filter syntax, and the provider-specific directory
//! layout for terraform configurations and ansible inventories.

use std::fmt;
use std::str::FromStr;

use crate::error::KcdError;

/// Supported cloud providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderProfile {
    Aws,
    Azure,
    Gcp,
}

impl ProviderProfile {
    /// Short name used in paths and user-facing output
    pub fn name(self) -> &'static str {
        match self {
            ProviderProfile::Aws => "aws",
            ProviderProfile::Azure => "azure",
            ProviderProfile::Gcp => "gcp",
        }
    }

    /// Directory holding this provider's terraform configuration
    pub fn terraform_dir(self) -> String {
        format!("terraform/{}", self.name())
    }

    /// Inventory path relative to the ansible directory on the bastion
    pub fn inventory_path(self) -> String {
        format!("inventories/{}/hosts", self.name())
    }
}

impl fmt::Display for ProviderProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderProfile {
    type Err = KcdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aws" => Ok(ProviderProfile::Aws),
            "azure" => Ok(ProviderProfile::Azure),
            "gcp" => Ok(ProviderProfile::Gcp),
            other => Err(KcdError::UnsupportedProvider {
                provider: other.to_string(),
            }),
        }
    }
}

/// Instance attribute projected by a discovery query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    PublicIp,
    PrivateIp,
}

impl AttributeKind {
    /// Field name in the provider's projection syntax
    pub fn projection(self, profile: ProviderProfile) -> &'static str {
        match (profile, self) {
            (ProviderProfile::Aws, AttributeKind::PublicIp) => "PublicIpAddress",
            (ProviderProfile::Aws, AttributeKind::PrivateIp) => "PrivateIpAddress",
            (ProviderProfile::Azure, AttributeKind::PublicIp) => "publicIps",
            (ProviderProfile::Azure, AttributeKind::PrivateIp) => "privateIps",
            (ProviderProfile::Gcp, AttributeKind::PublicIp) => {
                "networkInterfaces[0].accessConfigs[0].natIP"
            }
            (ProviderProfile::Gcp, AttributeKind::PrivateIp) => {
                "networkInterfaces[0].networkIP"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supported_providers() {
        assert_eq!("aws".parse::<ProviderProfile>().unwrap(), ProviderProfile::Aws);
        assert_eq!(
            "azure".parse::<ProviderProfile>().unwrap(),
            ProviderProfile::Azure
        );
        assert_eq!("gcp".parse::<ProviderProfile>().unwrap(), ProviderProfile::Gcp);
    }

    #[test]
    fn test_parse_unsupported_provider() {
        let err = "digitalocean".parse::<ProviderProfile>().unwrap_err();
        assert!(matches!(err, KcdError::UnsupportedProvider { .. }));
        assert!(err.to_string().contains("digitalocean"));
    }

    #[test]
    fn test_terraform_dir_per_provider() {
        assert_eq!(ProviderProfile::Aws.terraform_dir(), "terraform/aws");
        assert_eq!(ProviderProfile::Gcp.terraform_dir(), "terraform/gcp");
    }

    #[test]
    fn test_attribute_projection() {
        assert_eq!(
            AttributeKind::PublicIp.projection(ProviderProfile::Aws),
            "PublicIpAddress"
        );
        assert_eq!(
            AttributeKind::PrivateIp.projection(ProviderProfile::Azure),
            "privateIps"
        );
    }
}
