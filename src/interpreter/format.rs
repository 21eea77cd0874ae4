//! `print` format strings.
//!
//! `%d` truncates a Number, `%f` renders a Number with six decimals, `%b`
//! renders a Boolean, `%s` renders any value and `%%` is a literal percent.

use crate::runtime::error::RuntimeError;
use crate::runtime::number::expect_number;
use crate::runtime::object::Object;

pub(crate) fn render(format: &str, args: &[Object]) -> Result<String, RuntimeError> {
    let mut output = String::with_capacity(format.len());
    let mut args = args.iter();
    let mut chars = format.chars();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            output.push(ch);
            continue;
        }
        let specifier = chars.next().ok_or(RuntimeError::DanglingFormatPercent)?;
        if specifier == '%' {
            output.push('%');
            continue;
        }
        if !matches!(specifier, 'd' | 'f' | 'b' | 's') {
            return Err(RuntimeError::UnknownFormatSpecifier { specifier });
        }
        let arg = args
            .next()
            .ok_or(RuntimeError::MissingFormatArgument { specifier })?;
        match specifier {
            'd' => {
                let value = expect_number("%d", arg)?;
                output.push_str(&(value.trunc() as i64).to_string());
            }
            'f' => {
                let value = expect_number("%f", arg)?;
                output.push_str(&format!("{value:.6}"));
            }
            'b' => {
                let value = arg.as_bool().ok_or_else(|| RuntimeError::InvalidArgumentType {
                    operation: "%b".to_string(),
                    expected: "Boolean".to_string(),
                    got: arg.type_name(),
                })?;
                output.push_str(if value { "true" } else { "false" });
            }
            _ => output.push_str(&arg.to_output()),
        }
    }
    let unused = args.count();
    if unused > 0 {
        return Err(RuntimeError::UnusedFormatArguments { unused });
    }
    Ok(output)
}
