/// Entity abstraction shared by all record types
///
/// An entity is a serde document stored under its ID in one bucket. Its
/// descriptor table tells the repository and query engine which fields
/// exist, how they compare and how they are validated. The [`entity!`]
/// macro derives the trait from a field list so model files stay declarative.
use crate::db::Bucket;
use crate::store::field::{FieldDef, FieldRole, FieldValue};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

pub trait Entity: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Lowercase name used in messages and validation codes
    const NAME: &'static str;

    const BUCKET: Bucket;

    /// Descriptor table: ID first, then data fields, then timestamps
    fn fields() -> &'static [FieldDef];

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    fn created(&self) -> DateTime<Utc>;

    fn set_created(&mut self, at: DateTime<Utc>);

    fn updated(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn set_updated(&mut self, _at: DateTime<Utc>) {}

    /// Value of the named field, `None` if the entity has no such field
    fn value(&self, field: &str) -> Option<FieldValue>;

    /// Copy one named field from `from` into `self`; false if unknown
    fn copy_field(&mut self, from: &Self, field: &str) -> bool;

    fn field(name: &str) -> Option<&'static FieldDef> {
        Self::fields().iter().find(|def| def.name == name)
    }

    fn tracks_updated() -> bool {
        Self::fields().iter().any(|def| def.role == FieldRole::Updated)
    }
}

/// Implement [`Entity`] for a model struct.
///
/// ```ignore
/// entity! {
///     impl Entity for Device {
///         name: "device",
///         bucket: Devices,
///         fields {
///             key: String as "Key" => Check::MaxLength(100),
///         }
///         stamps(created, updated)
///     }
/// }
/// ```
///
/// The struct must have an `id: String` field and `DateTime<Utc>` stamp
/// fields. Omit the second stamp for append-only entities.
#[macro_export]
macro_rules! entity {
    (
        impl Entity for $ty:ident {
            name: $name:literal,
            bucket: $bucket:ident,
            fields {
                $( $field:ident : $fty:ty as $fname:literal $( => $check:expr )? ),* $(,)?
            }
            stamps($created:ident $(, $updated:ident)?)
        }
    ) => {
        impl $crate::store::Entity for $ty {
            const NAME: &'static str = $name;
            const BUCKET: $crate::db::Bucket = $crate::db::Bucket::$bucket;

            fn fields() -> &'static [$crate::store::FieldDef] {
                static FIELDS: &[$crate::store::FieldDef] = &[
                    $crate::store::FieldDef::id(),
                    $(
                        $crate::store::FieldDef::data(
                            $fname,
                            <$fty as $crate::store::FieldType>::KIND,
                            $crate::entity!(@check $($check)?),
                        ),
                    )*
                    $crate::store::FieldDef::created(),
                    $( $crate::entity!(@updated $updated), )?
                ];
                FIELDS
            }

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }

            fn created(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.$created
            }

            fn set_created(&mut self, at: ::chrono::DateTime<::chrono::Utc>) {
                self.$created = at;
            }

            $(
                fn updated(&self) -> Option<::chrono::DateTime<::chrono::Utc>> {
                    Some(self.$updated)
                }

                fn set_updated(&mut self, at: ::chrono::DateTime<::chrono::Utc>) {
                    self.$updated = at;
                }
            )?

            fn value(&self, field: &str) -> Option<$crate::store::FieldValue> {
                match field {
                    "ID" => Some($crate::store::FieldValue::Text(self.id.clone())),
                    $( $fname => Some($crate::store::FieldType::to_value(&self.$field)), )*
                    "Created" => Some($crate::store::FieldValue::Timestamp(self.$created)),
                    $( "Updated" => Some($crate::store::FieldValue::Timestamp(self.$updated)), )?
                    _ => None,
                }
            }

            fn copy_field(&mut self, from: &Self, field: &str) -> bool {
                match field {
                    "ID" => self.id = from.id.clone(),
                    $( $fname => self.$field = from.$field.clone(), )*
                    "Created" => self.$created = from.$created,
                    $( "Updated" => self.$updated = from.$updated, )?
                    _ => return false,
                }
                true
            }
        }
    };

    (@check) => {
        $crate::store::Check::None
    };

    (@check $check:expr) => {
        $check
    };

    (@updated $updated:ident) => {
        $crate::store::FieldDef::updated()
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::field::{Check, FieldKind};
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Probe {
        id: String,
        label: String,
        count: i64,
        created: DateTime<Utc>,
        updated: DateTime<Utc>,
    }

    crate::entity! {
        impl Entity for Probe {
            name: "probe",
            bucket: Devices,
            fields {
                label: String as "Label" => Check::MaxLength(8),
                count: i64 as "Count",
            }
            stamps(created, updated)
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct AppendOnly {
        id: String,
        note: String,
        created: DateTime<Utc>,
    }

    crate::entity! {
        impl Entity for AppendOnly {
            name: "append_only",
            bucket: Requests,
            fields {
                note: String as "Note",
            }
            stamps(created)
        }
    }

    #[test]
    fn test_descriptor_table() {
        let names: Vec<_> = Probe::fields().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["ID", "Label", "Count", "Created", "Updated"]);

        let label = Probe::field("Label").unwrap();
        assert_eq!(label.kind, FieldKind::Text);
        assert_eq!(label.check, Check::MaxLength(8));
        assert_eq!(Probe::field("Count").unwrap().kind, FieldKind::Integer);
        assert!(Probe::field("Missing").is_none());
        assert!(Probe::tracks_updated());
    }

    #[test]
    fn test_append_only_has_no_updated() {
        let names: Vec<_> = AppendOnly::fields().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["ID", "Note", "Created"]);
        assert!(!AppendOnly::tracks_updated());

        let mut record = AppendOnly::default();
        record.set_updated(Utc::now());
        assert_eq!(record.updated(), None);
        assert_eq!(record.value("Updated"), None);
    }

    #[test]
    fn test_value_and_copy_field() {
        let source = Probe {
            id: "abc".into(),
            label: "cam".into(),
            count: 4,
            ..Default::default()
        };

        assert_eq!(source.value("Label"), Some(FieldValue::from("cam")));
        assert_eq!(source.value("Count"), Some(FieldValue::Integer(4)));
        assert_eq!(source.value("label"), None);

        let mut target = Probe::default();
        assert!(target.copy_field(&source, "Count"));
        assert!(!target.copy_field(&source, "Nope"));
        assert_eq!(target.count, 4);
        assert_eq!(target.label, "");
    }
}
