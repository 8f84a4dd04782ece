use contacts_ldap_domain::types::{
    Address, Company, ContactId, ContactRecord, EmailAddress, PhoneLocation, PhoneNumber,
};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

// Every field is lenient: the upstream omits or nulls whatever the user never
// filled in, and sometimes sends numbers where text is expected. A field of an
// unexpected shape degrades to an empty value instead of failing the person.

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

/// Keeps the elements that can be read, drops the others.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(values) => values
            .into_iter()
            .filter_map(|value| T::deserialize(value).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(T::deserialize(Value::deserialize(deserializer)?).unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PhoneNumberDto {
    #[serde(default, deserialize_with = "lenient_string")]
    number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AddressDto {
    #[serde(default, deserialize_with = "lenient_string")]
    street: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    city: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    state: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    zip: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EmailAddressDto {
    #[serde(default, deserialize_with = "lenient_string")]
    address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ContactDataDto {
    #[serde(default, deserialize_with = "lenient_list")]
    phone_numbers: Vec<PhoneNumberDto>,
    #[serde(default, deserialize_with = "lenient_list")]
    addresses: Vec<AddressDto>,
    #[serde(default, deserialize_with = "lenient_list")]
    email_addresses: Vec<EmailAddressDto>,
}

/// One person of a search response. Only fails to deserialize when the value
/// is not a JSON object at all.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PersonDto {
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    contact_data: ContactDataDto,
}

impl From<PersonDto> for ContactRecord {
    fn from(person: PersonDto) -> Self {
        let first_name = person.first_name.unwrap_or_default();
        let last_name = person.last_name.unwrap_or_default();
        let display_name = person
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("{first_name} {last_name}").trim().to_owned());
        let contact_data = person.contact_data;
        ContactRecord {
            id: person.id.map(ContactId::from).unwrap_or_default(),
            last_name,
            first_name,
            display_name,
            title: person.title.unwrap_or_default(),
            company: person
                .company_name
                .filter(|n| !n.is_empty())
                .map(|name| Company { name }),
            phone_numbers: contact_data
                .phone_numbers
                .into_iter()
                .map(|p| PhoneNumber {
                    number: p.number.unwrap_or_default(),
                    location: PhoneLocation::from(p.location.as_deref().unwrap_or_default()),
                })
                .collect(),
            addresses: contact_data
                .addresses
                .into_iter()
                .map(|a| Address {
                    street: a.street.unwrap_or_default(),
                    city: a.city.unwrap_or_default(),
                    state: a.state.unwrap_or_default(),
                    zip: a.zip.unwrap_or_default(),
                })
                .collect(),
            email_addresses: contact_data
                .email_addresses
                .into_iter()
                .map(|e| EmailAddress {
                    address: e.address.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_person() {
        let person: PersonDto = serde_json::from_str(
            r#"{
                "id": 42,
                "first_name": "Bob",
                "last_name": "Smith",
                "title": "CEO",
                "company_name": "Acme",
                "contact_data": {
                    "phone_numbers": [
                        {"number": "555-1", "location": "Work"},
                        {"number": "555-2", "location": "Skype"}
                    ],
                    "addresses": [
                        {"street": "1 Main St", "city": "Springfield", "state": "IL", "zip": "62701", "country": "US"}
                    ],
                    "email_addresses": [{"address": "bob@acme.test", "location": "Work"}]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            ContactRecord::from(person),
            ContactRecord {
                id: ContactId::new("42"),
                last_name: "Smith".to_owned(),
                first_name: "Bob".to_owned(),
                display_name: "Bob Smith".to_owned(),
                title: "CEO".to_owned(),
                company: Some(Company {
                    name: "Acme".to_owned()
                }),
                phone_numbers: vec![
                    PhoneNumber {
                        number: "555-1".to_owned(),
                        location: PhoneLocation::Work,
                    },
                    PhoneNumber {
                        number: "555-2".to_owned(),
                        location: PhoneLocation::Other("Skype".to_owned()),
                    },
                ],
                addresses: vec![Address {
                    street: "1 Main St".to_owned(),
                    city: "Springfield".to_owned(),
                    state: "IL".to_owned(),
                    zip: "62701".to_owned(),
                }],
                email_addresses: vec![EmailAddress {
                    address: "bob@acme.test".to_owned()
                }],
            }
        );
    }

    #[test]
    fn test_sparse_person() {
        let person: PersonDto = serde_json::from_str(
            r#"{"id": "abc", "first_name": null, "last_name": "Solo", "contact_data": {"addresses": null}}"#,
        )
        .unwrap();
        assert_eq!(
            ContactRecord::from(person),
            ContactRecord {
                id: ContactId::new("abc"),
                last_name: "Solo".to_owned(),
                display_name: "Solo".to_owned(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_explicit_name_wins() {
        let person: PersonDto = serde_json::from_str(
            r#"{"id": 1, "first_name": "Robert", "last_name": "Smith", "name": "Bobby"}"#,
        )
        .unwrap();
        assert_eq!(ContactRecord::from(person).display_name, "Bobby");
    }

    #[test]
    fn test_unexpected_field_types_degrade() {
        let person: PersonDto = serde_json::from_str(
            r#"{
                "id": -3,
                "first_name": "Ann",
                "title": 7,
                "company_name": {"name": "Acme"},
                "contact_data": {
                    "phone_numbers": [
                        {"number": 5551234, "location": "Work"},
                        "not a phone",
                        {"number": "555-9", "location": 3}
                    ],
                    "addresses": "unknown",
                    "email_addresses": [{"address": ["a@b.test"]}]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            ContactRecord::from(person),
            ContactRecord {
                id: ContactId::new("-3"),
                first_name: "Ann".to_owned(),
                display_name: "Ann".to_owned(),
                title: "7".to_owned(),
                phone_numbers: vec![
                    PhoneNumber {
                        number: "5551234".to_owned(),
                        location: PhoneLocation::Work,
                    },
                    PhoneNumber {
                        number: "555-9".to_owned(),
                        location: PhoneLocation::Other("3".to_owned()),
                    },
                ],
                email_addresses: vec![EmailAddress {
                    address: String::new(),
                }],
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_contact_data_of_the_wrong_shape() {
        let person: PersonDto =
            serde_json::from_str(r#"{"id": 1.5, "last_name": "Doe", "contact_data": "none"}"#)
                .unwrap();
        let record = ContactRecord::from(person);
        assert_eq!(record.id, ContactId::new("1.5"));
        assert!(record.phone_numbers.is_empty());
        assert!(record.addresses.is_empty());
    }

    #[test]
    fn test_person_must_be_an_object() {
        assert!(serde_json::from_str::<PersonDto>("42").is_err());
    }
}
