/// Lets an identifier newtype be used as a sea-orm column and primary key.
///
/// The wrapped value is stored as its textual form (`CHAR(36)` for uuids) and parsed
/// back with [`std::str::FromStr`] when a row is read.
macro_rules! impls_for_seaorm_newtype {
    ($newtype: ty) => {
        impl std::convert::From<$newtype> for sea_orm::Value {
            fn from(source: $newtype) -> Self {
                source.0.to_string().into()
            }
        }
        // column filters take a reference
        impl std::convert::From<&$newtype> for sea_orm::Value {
            fn from(source: &$newtype) -> Self {
                source.0.to_string().into()
            }
        }

        impl sea_orm::TryGetable for $newtype {
            fn try_get_by<I: sea_orm::ColIdx>(
                res: &sea_orm::QueryResult,
                idx: I,
            ) -> Result<Self, sea_orm::TryGetError> {
                let s: String = <String as sea_orm::TryGetable>::try_get_by(res, idx)?;

                s.parse().map_err(|error| {
                    sea_orm::TryGetError::DbErr(sea_orm::error::DbErr::Type(format!(
                        "Invalid {} `{s}`: {error}",
                        stringify!($newtype)
                    )))
                })
            }
        }

        impl sea_orm::sea_query::ValueType for $newtype {
            fn try_from(v: sea_orm::Value) -> Result<Self, sea_orm::sea_query::ValueTypeErr> {
                <String as sea_orm::sea_query::ValueType>::try_from(v)?
                    .parse()
                    .map_err(|_| sea_orm::sea_query::ValueTypeErr)
            }

            fn type_name() -> String {
                stringify!($newtype).to_owned()
            }

            fn array_type() -> sea_orm::sea_query::ArrayType {
                sea_orm::sea_query::ArrayType::String
            }

            fn column_type() -> sea_orm::sea_query::ColumnType {
                sea_orm::sea_query::ColumnType::String(sea_orm::sea_query::StringLen::None)
            }
        }

        // `find_by_id`
        impl std::convert::From<&$newtype> for $newtype {
            fn from(source: &$newtype) -> Self {
                *source
            }
        }

        // nullable columns
        impl sea_orm::sea_query::value::Nullable for $newtype {
            fn null() -> sea_orm::Value {
                sea_orm::Value::String(None)
            }
        }

        // primary keys are never auto-incremented
        impl sea_orm::TryFromU64 for $newtype {
            fn try_from_u64(_n: u64) -> Result<Self, sea_orm::DbErr> {
                Err(sea_orm::DbErr::ConvertFromU64(stringify!($newtype)))
            }
        }
    };
}
pub(crate) use impls_for_seaorm_newtype;

/// Parsing, display and uuid conversions for an identifier newtype
macro_rules! impls_for_uuid_newtype {
    ($newtype: ty) => {
        impl std::str::FromStr for $newtype {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }

        impl std::cmp::PartialEq<uuid::Uuid> for $newtype {
            fn eq(&self, other: &uuid::Uuid) -> bool {
                self.0.eq(other)
            }
        }

        impl $newtype {
            /// Random (v4) identifier.
            pub fn new_random() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        $crate::macros::impl_display!($newtype);
        $crate::macros::impl_from!($newtype; uuid::Uuid);
        $crate::macros::impl_into!($newtype; uuid::Uuid);
    };
}
pub(crate) use impls_for_uuid_newtype;

/// Delegates [`std::fmt::Display`] to the wrapped value.
macro_rules! impl_display {
    ($newtype: ty) => {
        impl std::fmt::Display for $newtype {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}
pub(crate) use impl_display;

/// Implements [`std::convert::From`]
macro_rules! impl_from {
    ($newtype: ty; $inner: ty) => {
        impl std::convert::From<$inner> for $newtype {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }
    };
}
pub(crate) use impl_from;

/// Implements [`std::convert::Into`]
macro_rules! impl_into {
    ($newtype: ty; $inner: ty) => {
        impl std::convert::From<$newtype> for $inner {
            fn from(value: $newtype) -> Self {
                value.0.into()
            }
        }
    };
}
pub(crate) use impl_into;
