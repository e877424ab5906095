//! Status helper enums mapping to SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data in the
//! corresponding lookup table.

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Look up a variant by its database ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// Display label as seeded in the lookup table.
            pub fn label(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Project lifecycle status (`project_status` table).
    ProjectStatus {
        Planning = 1 => "Planning",
        OnGoing = 2 => "On Going",
        Done = 3 => "Done",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_seed_data() {
        assert_eq!(ProjectStatus::Planning.id(), 1);
        assert_eq!(ProjectStatus::OnGoing.id(), 2);
        assert_eq!(ProjectStatus::Done.id(), 3);
    }

    #[test]
    fn from_id_roundtrip() {
        assert_eq!(ProjectStatus::from_id(2), Some(ProjectStatus::OnGoing));
        assert_eq!(ProjectStatus::from_id(9), None);
        assert_eq!(ProjectStatus::Done.label(), "Done");
    }
}
