/// Identifier of a contact in the upstream directory.
#[derive(
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    derive_more::Debug,
    derive_more::Display,
    derive_more::From,
)]
#[debug(r#""{_0}""#)]
#[display("{_0}")]
pub struct ContactId(String);

impl ContactId {
    pub fn new(raw: &str) -> Self {
        Self(raw.to_owned())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for ContactId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<u64> for ContactId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// Category attached to a phone number by the upstream directory.
///
/// Only the four well-known categories are mapped to directory attributes,
/// anything else is carried through as `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PhoneLocation {
    Work,
    Home,
    Fax,
    Mobile,
    Other(String),
}

impl From<&str> for PhoneLocation {
    fn from(s: &str) -> Self {
        match s {
            "Work" => PhoneLocation::Work,
            "Home" => PhoneLocation::Home,
            "Fax" => PhoneLocation::Fax,
            "Mobile" => PhoneLocation::Mobile,
            other => PhoneLocation::Other(other.to_owned()),
        }
    }
}

impl Default for PhoneLocation {
    fn default() -> Self {
        PhoneLocation::Other(String::new())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhoneNumber {
    pub number: String,
    pub location: PhoneLocation,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmailAddress {
    pub address: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Company {
    pub name: String,
}

/// A person as returned by the upstream contact directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactRecord {
    pub id: ContactId,
    pub last_name: String,
    pub first_name: String,
    pub display_name: String,
    pub title: String,
    pub company: Option<Company>,
    pub phone_numbers: Vec<PhoneNumber>,
    pub addresses: Vec<Address>,
    pub email_addresses: Vec<EmailAddress>,
}

impl ContactRecord {
    pub fn phone_numbers_at<'a>(
        &'a self,
        location: &'a PhoneLocation,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.phone_numbers
            .iter()
            .filter(move |p| &p.location == location)
            .map(|p| p.number.as_str())
    }
}
