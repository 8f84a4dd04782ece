use crate::core::{error::SearchRejection, utils::LdapInfo};
use contacts_ldap_domain::types::{ContactRecord, PhoneLocation};
use ldap3_proto::{LdapPartialAttribute, LdapSearchResultEntry};

pub const CONTACT_OBJECT_CLASSES: &[&str] = &[
    "top",
    "person",
    "organizationalPerson",
    "inetOrgPerson",
    "mozillaOrgPerson",
];

/// Attributes of every contact entry, in emission order.
pub const ALL_CONTACT_ATTRIBUTES: &[&str] = &[
    "objectclass",
    "uid",
    "sn",
    "givenName",
    "cn",
    "title",
    "o",
    "telephonenumber",
    "homephone",
    "fax",
    "mobile",
    "street",
    "l",
    "st",
    "postalcode",
    "mail",
];

// Characters that would need escaping in an RDN value.
const DN_SPECIAL_CHARACTERS: &[char] = &[',', '=', '+', '"', '\\', '<', '>', ';'];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub dn: String,
    /// One entry per name of `ALL_CONTACT_ATTRIBUTES`, possibly without values.
    pub attributes: Vec<(&'static str, Vec<String>)>,
}

impl DirectoryEntry {
    pub fn get(&self, attribute: &str) -> Option<&[String]> {
        self.attributes
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(attribute))
            .map(|(_, values)| values.as_slice())
    }
}

fn single(value: &str) -> Vec<String> {
    vec![value.to_string()]
}

fn phone_numbers(record: &ContactRecord, location: PhoneLocation) -> Vec<String> {
    record
        .phone_numbers_at(&location)
        .map(str::to_string)
        .collect()
}

fn per_address<F>(record: &ContactRecord, field: F) -> Vec<String>
where
    F: Fn(&contacts_ldap_domain::types::Address) -> &String,
{
    record.addresses.iter().map(field).cloned().collect()
}

pub fn make_contact_dn(record: &ContactRecord, base_dn_str: &str) -> String {
    format!("uid={},{}", record.id, base_dn_str)
}

/// Converts a contact into its directory entry. Every attribute is present,
/// missing data just leaves it without values.
pub fn contact_to_entry(record: &ContactRecord, base_dn_str: &str) -> DirectoryEntry {
    DirectoryEntry {
        dn: make_contact_dn(record, base_dn_str),
        attributes: vec![
            (
                "objectclass",
                CONTACT_OBJECT_CLASSES
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            ),
            ("uid", single(record.id.as_str())),
            ("sn", single(&record.last_name)),
            ("givenName", single(&record.first_name)),
            ("cn", single(&record.display_name)),
            ("title", single(&record.title)),
            (
                "o",
                record.company.iter().map(|c| c.name.clone()).collect(),
            ),
            ("telephonenumber", phone_numbers(record, PhoneLocation::Work)),
            ("homephone", phone_numbers(record, PhoneLocation::Home)),
            ("fax", phone_numbers(record, PhoneLocation::Fax)),
            ("mobile", phone_numbers(record, PhoneLocation::Mobile)),
            ("street", per_address(record, |a| &a.street)),
            ("l", per_address(record, |a| &a.city)),
            ("st", per_address(record, |a| &a.state)),
            ("postalcode", per_address(record, |a| &a.zip)),
            (
                "mail",
                record
                    .email_addresses
                    .iter()
                    .map(|e| e.address.clone())
                    .collect(),
            ),
        ],
    }
}

fn check_contact_id(record: &ContactRecord) -> Result<(), SearchRejection> {
    if record.id.is_blank() {
        return Err(SearchRejection::Mapping(format!(
            "contact without an identifier: {:?}",
            record.display_name
        )));
    }
    if record.id.as_str().contains(DN_SPECIAL_CHARACTERS) {
        return Err(SearchRejection::Mapping(format!(
            "contact identifier {} cannot be used in a DN",
            record.id
        )));
    }
    Ok(())
}

/// Builds the search result for one contact.
///
/// Attributes whose values are all empty are left out of the result, the
/// others keep their positional values (an address without a city still
/// takes its slot in `l`).
pub fn make_ldap_search_contact_result_entry(
    record: &ContactRecord,
    ldap_info: &LdapInfo,
) -> Result<LdapSearchResultEntry, SearchRejection> {
    check_contact_id(record)?;
    let entry = contact_to_entry(record, &ldap_info.base_dn_str);
    Ok(LdapSearchResultEntry {
        dn: entry.dn,
        attributes: entry
            .attributes
            .into_iter()
            .filter(|(_, values)| values.iter().any(|v| !v.is_empty()))
            .map(|(name, values)| LdapPartialAttribute {
                atype: name.to_string(),
                vals: values.into_iter().map(String::into_bytes).collect(),
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contacts_ldap_domain::types::{
        Address, Company, ContactId, EmailAddress, PhoneNumber,
    };
    use pretty_assertions::assert_eq;

    const BASE_DN: &str = "dc=example,dc=com";

    fn phone(location: PhoneLocation, number: &str) -> PhoneNumber {
        PhoneNumber {
            number: number.to_string(),
            location,
        }
    }

    fn full_contact() -> ContactRecord {
        ContactRecord {
            id: ContactId::new("42"),
            last_name: "Smith".to_string(),
            first_name: "Bob".to_string(),
            display_name: "Bob Smith".to_string(),
            title: "CEO".to_string(),
            company: Some(Company {
                name: "Acme".to_string(),
            }),
            phone_numbers: vec![
                phone(PhoneLocation::Work, "1"),
                phone(PhoneLocation::Home, "2"),
                phone(PhoneLocation::Work, "3"),
                phone(PhoneLocation::Fax, "4"),
                phone(PhoneLocation::Mobile, "5"),
                phone(PhoneLocation::Other("Pager".to_string()), "6"),
            ],
            addresses: vec![
                Address {
                    street: "1 Main St".to_string(),
                    city: "Springfield".to_string(),
                    state: "IL".to_string(),
                    zip: "62701".to_string(),
                },
                Address {
                    street: "2 Side St".to_string(),
                    city: String::new(),
                    state: "CA".to_string(),
                    zip: "90001".to_string(),
                },
            ],
            email_addresses: vec![
                EmailAddress {
                    address: "bob@acme.test".to_string(),
                },
                EmailAddress {
                    address: "bob@home.test".to_string(),
                },
            ],
        }
    }

    fn values(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_full_contact_to_entry() {
        assert_eq!(
            contact_to_entry(&full_contact(), BASE_DN),
            DirectoryEntry {
                dn: "uid=42,dc=example,dc=com".to_string(),
                attributes: vec![
                    (
                        "objectclass",
                        values(&[
                            "top",
                            "person",
                            "organizationalPerson",
                            "inetOrgPerson",
                            "mozillaOrgPerson"
                        ])
                    ),
                    ("uid", values(&["42"])),
                    ("sn", values(&["Smith"])),
                    ("givenName", values(&["Bob"])),
                    ("cn", values(&["Bob Smith"])),
                    ("title", values(&["CEO"])),
                    ("o", values(&["Acme"])),
                    ("telephonenumber", values(&["1", "3"])),
                    ("homephone", values(&["2"])),
                    ("fax", values(&["4"])),
                    ("mobile", values(&["5"])),
                    ("street", values(&["1 Main St", "2 Side St"])),
                    ("l", values(&["Springfield", ""])),
                    ("st", values(&["IL", "CA"])),
                    ("postalcode", values(&["62701", "90001"])),
                    ("mail", values(&["bob@acme.test", "bob@home.test"])),
                ],
            }
        );
    }

    #[test]
    fn test_empty_contact_has_every_attribute() {
        let entry = contact_to_entry(
            &ContactRecord {
                id: ContactId::new("7"),
                ..Default::default()
            },
            BASE_DN,
        );
        assert_eq!(
            entry
                .attributes
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>(),
            ALL_CONTACT_ATTRIBUTES.to_vec()
        );
        for attribute in [
            "o",
            "telephonenumber",
            "homephone",
            "fax",
            "mobile",
            "street",
            "l",
            "st",
            "postalcode",
            "mail",
        ] {
            assert_eq!(entry.get(attribute), Some(&[][..]), "{attribute}");
        }
        assert_eq!(entry.get("sn"), Some(&values(&[""])[..]));
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let record = full_contact();
        assert_eq!(
            contact_to_entry(&record, BASE_DN),
            contact_to_entry(&record, BASE_DN)
        );
    }

    #[test]
    fn test_result_entry_skips_empty_attributes() {
        let ldap_info = LdapInfo::new(BASE_DN).unwrap();
        let entry = make_ldap_search_contact_result_entry(
            &ContactRecord {
                id: ContactId::new("7"),
                last_name: "Solo".to_string(),
                addresses: vec![
                    Address {
                        city: "Paris".to_string(),
                        ..Default::default()
                    },
                    Address::default(),
                ],
                ..Default::default()
            },
            &ldap_info,
        )
        .unwrap();
        assert_eq!(
            entry,
            LdapSearchResultEntry {
                dn: "uid=7,dc=example,dc=com".to_string(),
                attributes: vec![
                    LdapPartialAttribute {
                        atype: "objectclass".to_string(),
                        vals: CONTACT_OBJECT_CLASSES
                            .iter()
                            .map(|c| c.as_bytes().to_vec())
                            .collect(),
                    },
                    LdapPartialAttribute {
                        atype: "uid".to_string(),
                        vals: vec![b"7".to_vec()],
                    },
                    LdapPartialAttribute {
                        atype: "sn".to_string(),
                        vals: vec![b"Solo".to_vec()],
                    },
                    LdapPartialAttribute {
                        atype: "l".to_string(),
                        vals: vec![b"Paris".to_vec(), b"".to_vec()],
                    },
                ],
            }
        );
    }

    #[test]
    fn test_result_entry_needs_usable_id() {
        let ldap_info = LdapInfo::new(BASE_DN).unwrap();
        assert!(matches!(
            make_ldap_search_contact_result_entry(&ContactRecord::default(), &ldap_info),
            Err(SearchRejection::Mapping(_))
        ));
        assert!(matches!(
            make_ldap_search_contact_result_entry(
                &ContactRecord {
                    id: ContactId::new("a,b"),
                    ..Default::default()
                },
                &ldap_info
            ),
            Err(SearchRejection::Mapping(_))
        ));
    }
}
