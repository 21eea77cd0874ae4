use crate::runtime::error::RuntimeError;
use crate::runtime::object::Object;

pub(crate) fn call_member(
    value: bool,
    name: &str,
    args: Vec<Object>,
) -> Result<Object, RuntimeError> {
    match name {
        "to_string" => {
            RuntimeError::expect_arity(name, 0, args.len())?;
            Ok(Object::string(value.to_string()))
        }
        _ => Err(RuntimeError::UnknownMember {
            member: name.to_string(),
            type_name: "Boolean".to_string(),
        }),
    }
}
