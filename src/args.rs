//! Conversion of typed job arguments into JSON values.
//!
//! Sidekiq jobs take positional JSON arguments. [`ToArg`] converts a single
//! Rust value and rejects anything JSON cannot carry losslessly; [`JobArgs`]
//! turns a tuple (or vector) of such values into the ordered argument list.

use crate::error::{KiqError, KiqResult};
use serde_json::{Map, Number, Value};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// A value that can be passed as one positional job argument.
pub trait ToArg {
    /// Convert to JSON, failing if the value is not representable.
    fn to_arg(&self) -> KiqResult<Value>;
}

macro_rules! lossless_args {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToArg for $ty {
                fn to_arg(&self) -> KiqResult<Value> {
                    Ok(Value::from(*self))
                }
            }
        )*
    };
}

lossless_args!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

fn float_arg(value: f64) -> KiqResult<Value> {
    Number::from_f64(value).map(Value::Number).ok_or_else(|| {
        KiqError::serialization(format!("non-finite number {} is not a valid job argument", value))
    })
}

impl ToArg for f64 {
    fn to_arg(&self) -> KiqResult<Value> {
        float_arg(*self)
    }
}

impl ToArg for f32 {
    fn to_arg(&self) -> KiqResult<Value> {
        float_arg(f64::from(*self))
    }
}

impl ToArg for str {
    fn to_arg(&self) -> KiqResult<Value> {
        Ok(Value::String(self.to_owned()))
    }
}

impl ToArg for String {
    fn to_arg(&self) -> KiqResult<Value> {
        Ok(Value::String(self.clone()))
    }
}

impl ToArg for Value {
    fn to_arg(&self) -> KiqResult<Value> {
        Ok(self.clone())
    }
}

impl<T: ToArg + ?Sized> ToArg for &T {
    fn to_arg(&self) -> KiqResult<Value> {
        (**self).to_arg()
    }
}

impl<T: ToArg> ToArg for Option<T> {
    fn to_arg(&self) -> KiqResult<Value> {
        match self {
            Some(value) => value.to_arg(),
            None => Ok(Value::Null),
        }
    }
}

impl<T: ToArg> ToArg for [T] {
    fn to_arg(&self) -> KiqResult<Value> {
        self.iter()
            .map(ToArg::to_arg)
            .collect::<KiqResult<Vec<_>>>()
            .map(Value::Array)
    }
}

impl<T: ToArg> ToArg for Vec<T> {
    fn to_arg(&self) -> KiqResult<Value> {
        self.as_slice().to_arg()
    }
}

impl<T: ToArg> ToArg for BTreeMap<String, T> {
    fn to_arg(&self) -> KiqResult<Value> {
        object_arg(self.iter())
    }
}

impl<T: ToArg, S: BuildHasher> ToArg for HashMap<String, T, S> {
    fn to_arg(&self) -> KiqResult<Value> {
        object_arg(self.iter())
    }
}

fn object_arg<'a, T: ToArg + 'a>(
    entries: impl Iterator<Item = (&'a String, &'a T)>,
) -> KiqResult<Value> {
    let mut object = Map::new();
    for (key, value) in entries {
        object.insert(key.clone(), value.to_arg()?);
    }
    Ok(Value::Object(object))
}

/// The complete positional argument list of one job invocation.
pub trait JobArgs {
    /// Convert into the ordered list of JSON arguments.
    fn into_args(self) -> KiqResult<Vec<Value>>;
}

impl JobArgs for () {
    fn into_args(self) -> KiqResult<Vec<Value>> {
        Ok(Vec::new())
    }
}

impl<T: ToArg> JobArgs for Vec<T> {
    fn into_args(self) -> KiqResult<Vec<Value>> {
        self.iter().map(ToArg::to_arg).collect()
    }
}

macro_rules! tuple_args {
    ($($name:ident),+) => {
        impl<$($name: ToArg),+> JobArgs for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_args(self) -> KiqResult<Vec<Value>> {
                let ($($name,)+) = self;
                Ok(vec![$($name.to_arg()?),+])
            }
        }
    };
}

tuple_args!(A);
tuple_args!(A, B);
tuple_args!(A, B, C);
tuple_args!(A, B, C, D);
tuple_args!(A, B, C, D, E);
tuple_args!(A, B, C, D, E, F);
tuple_args!(A, B, C, D, E, F, G);
tuple_args!(A, B, C, D, E, F, G, H);
