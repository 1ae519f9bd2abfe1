//! Helpers injected into every sandboxed render.
//!
//! | Name       | Kind     | Members |
//! |------------|----------|---------|
//! | `now`      | function | `now()` returns local time as `%Y%m%d-%H%M%S` |
//! | `datetime` | module   | `now()`, `utcnow()`, `today()`, `datetime` (alias of itself) |
//! | `random`   | module   | `random()`, `randint(a, b)`, `uniform(a, b)`, `randrange(...)`, `choice(seq)` |
//! | `math`     | module   | `pi`, `e`, `tau`, `inf`, `floor`, `ceil`, `trunc`, `fabs`, `sqrt`, `pow`, `exp`, `log`, `log10`, `sin`, `cos`, `tan` |
//!
//! The `now`, `datetime` and `random` values change between renders, which is
//! why templates mentioning them are always treated as changed.

use chrono::{Datelike, Local, NaiveDateTime, Timelike, Utc};
use minijinja::value::{Object, ObjectRepr, Value, from_args};
use minijinja::{Environment, Error, ErrorKind, State};
use rand::Rng;
use std::fmt::{self, Write as _};
use std::sync::Arc;

/// Format produced by the `now()` helper.
pub const NOW_FORMAT: &str = "%Y%m%d-%H%M%S";

const TIMESTAMP_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const TIMESTAMP_ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Installs `now`, `datetime`, `random` and `math` into `env`.
pub fn register(env: &mut Environment<'_>) {
    env.add_function("now", now);
    env.add_global("datetime", Value::from_object(DatetimeModule));
    env.add_global("random", Value::from_object(RandomModule));
    env.add_global("math", Value::from_object(MathModule));
}

/// Current local time, formatted with [`NOW_FORMAT`].
pub fn now() -> String {
    Local::now().format(NOW_FORMAT).to_string()
}

fn expect_no_args(method: &str, args: &[Value]) -> Result<(), Error> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(Error::new(
            ErrorKind::TooManyArguments,
            format!("{method}() takes no arguments"),
        ))
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::InvalidOperation, message.into())
}

/// A point in time returned by `datetime.now()` and friends.
#[derive(Debug, Clone, Copy)]
pub struct Timestamp(pub NaiveDateTime);

impl Timestamp {
    pub fn strftime(&self, format: &str) -> Result<String, Error> {
        let mut out = String::new();
        write!(out, "{}", self.0.format(format))
            .map_err(|_| invalid(format!("invalid strftime format '{format}'")))?;
        Ok(out)
    }
}

impl Object for Timestamp {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let dt = &self.0;
        let field = match key.as_str()? {
            "year" => dt.year() as i64,
            "month" => dt.month() as i64,
            "day" => dt.day() as i64,
            "hour" => dt.hour() as i64,
            "minute" => dt.minute() as i64,
            "second" => dt.second() as i64,
            _ => return None,
        };
        Some(Value::from(field))
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        method: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        match method {
            "strftime" => {
                let (format,): (&str,) = from_args(args)?;
                Ok(Value::from(self.strftime(format)?))
            }
            "isoformat" => {
                expect_no_args(method, args)?;
                Ok(Value::from(self.strftime(TIMESTAMP_ISO_FORMAT)?))
            }
            _ => Err(Error::from(ErrorKind::UnknownMethod)),
        }
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_DISPLAY_FORMAT))
    }
}

/// The `datetime` global.
#[derive(Debug)]
pub struct DatetimeModule;

impl Object for DatetimeModule {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        match key.as_str()? {
            "datetime" => Some(Value::from_object(DatetimeModule)),
            _ => None,
        }
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        method: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        let dt = match method {
            "now" | "today" => Local::now().naive_local(),
            "utcnow" => Utc::now().naive_utc(),
            _ => return Err(Error::from(ErrorKind::UnknownMethod)),
        };
        expect_no_args(method, args)?;
        Ok(Value::from_object(Timestamp(dt)))
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<module 'datetime'>")
    }
}

/// The `random` global.
#[derive(Debug)]
pub struct RandomModule;

impl Object for RandomModule {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        method: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        let mut rng = rand::thread_rng();
        match method {
            "random" => {
                expect_no_args(method, args)?;
                Ok(Value::from(rng.r#gen::<f64>()))
            }
            "randint" => {
                let (low, high): (i64, i64) = from_args(args)?;
                if low > high {
                    return Err(invalid(format!("empty range for randint({low}, {high})")));
                }
                Ok(Value::from(rng.gen_range(low..=high)))
            }
            "uniform" => {
                let (a, b): (f64, f64) = from_args(args)?;
                Ok(Value::from(a + (b - a) * rng.r#gen::<f64>()))
            }
            "randrange" => {
                let (first, second): (i64, Option<i64>) = from_args(args)?;
                let (start, stop) = match second {
                    Some(stop) => (first, stop),
                    None => (0, first),
                };
                if start >= stop {
                    return Err(invalid(format!("empty range for randrange({start}, {stop})")));
                }
                Ok(Value::from(rng.gen_range(start..stop)))
            }
            "choice" => {
                let (seq,): (Value,) = from_args(args)?;
                let items: Vec<Value> = seq.try_iter()?.collect();
                if items.is_empty() {
                    return Err(invalid("cannot choose from an empty sequence"));
                }
                Ok(items[rng.gen_range(0..items.len())].clone())
            }
            _ => Err(Error::from(ErrorKind::UnknownMethod)),
        }
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<module 'random'>")
    }
}

/// The `math` global.
#[derive(Debug)]
pub struct MathModule;

impl Object for MathModule {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let constant = match key.as_str()? {
            "pi" => std::f64::consts::PI,
            "e" => std::f64::consts::E,
            "tau" => std::f64::consts::TAU,
            "inf" => f64::INFINITY,
            _ => return None,
        };
        Some(Value::from(constant))
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        method: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        match method {
            "floor" | "ceil" | "trunc" => {
                let (x,): (f64,) = from_args(args)?;
                let rounded = match method {
                    "floor" => x.floor(),
                    "ceil" => x.ceil(),
                    _ => x.trunc(),
                };
                if !rounded.is_finite() {
                    return Err(invalid(format!("cannot convert {x} to integer")));
                }
                // Beyond i64 the float is already integral; a cast would saturate.
                if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
                    return Ok(Value::from(rounded));
                }
                Ok(Value::from(rounded as i64))
            }
            "pow" => {
                let (x, y): (f64, f64) = from_args(args)?;
                Ok(Value::from(x.powf(y)))
            }
            "log" => {
                let (x, base): (f64, Option<f64>) = from_args(args)?;
                if x <= 0.0 {
                    return Err(invalid("math domain error"));
                }
                Ok(Value::from(match base {
                    Some(base) => x.log(base),
                    None => x.ln(),
                }))
            }
            "fabs" | "sqrt" | "exp" | "log10" | "sin" | "cos" | "tan" => {
                let (x,): (f64,) = from_args(args)?;
                let result = match method {
                    "fabs" => x.abs(),
                    "sqrt" if x < 0.0 => return Err(invalid("math domain error")),
                    "sqrt" => x.sqrt(),
                    "exp" => x.exp(),
                    "log10" if x <= 0.0 => return Err(invalid("math domain error")),
                    "log10" => x.log10(),
                    "sin" => x.sin(),
                    "cos" => x.cos(),
                    _ => x.tan(),
                };
                Ok(Value::from(result))
            }
            _ => Err(Error::from(ErrorKind::UnknownMethod)),
        }
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<module 'math'>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Environment<'static> {
        let mut env = Environment::new();
        register(&mut env);
        env
    }

    fn render(source: &str) -> String {
        env().render_str(source, ()).unwrap()
    }

    #[test]
    fn test_now_format() {
        let stamp = now();
        assert_eq!(stamp.len(), "20240101-120000".len());
        assert_eq!(stamp.as_bytes()[8], b'-');
        assert!(stamp.chars().filter(|c| *c != '-').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_now_in_template() {
        assert_eq!(render("{{ now() }}").len(), 15);
    }

    #[test]
    fn test_datetime_strftime_and_fields() {
        let year = render("{{ datetime.now().strftime('%Y') }}");
        assert_eq!(year, render("{{ datetime.now().year }}"));
        assert_eq!(year.len(), 4);
        assert_eq!(render("{{ datetime.datetime.utcnow().strftime('%m') }}").len(), 2);
    }

    #[test]
    fn test_datetime_renders_like_python() {
        let out = render("{{ datetime.now() }}");
        // 2024-01-01 12:00:00.000000
        assert_eq!(out.len(), 26);
        assert_eq!(&out[10..11], " ");
    }

    #[test]
    fn test_invalid_strftime_is_error() {
        let err = env()
            .render_str("{{ datetime.now().strftime('%Q') }}", ())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    }

    #[test]
    fn test_random_ranges() {
        for _ in 0..20 {
            let v: i64 = render("{{ random.randint(1, 3) }}").parse().unwrap();
            assert!((1..=3).contains(&v));

            let r: f64 = render("{{ random.random() }}").parse().unwrap();
            assert!((0.0..1.0).contains(&r));

            let c = render("{{ random.choice(['a', 'b']) }}");
            assert!(c == "a" || c == "b");

            let n: i64 = render("{{ random.randrange(5) }}").parse().unwrap();
            assert!((0..5).contains(&n));
        }
    }

    #[test]
    fn test_random_empty_range_is_error() {
        assert!(env().render_str("{{ random.randint(3, 1) }}", ()).is_err());
        assert!(env().render_str("{{ random.choice([]) }}", ()).is_err());
    }

    #[test]
    fn test_math_helpers() {
        assert_eq!(render("{{ math.floor(2.7) }}"), "2");
        assert_eq!(render("{{ math.ceil(2.1) }}"), "3");
        assert_eq!(render("{{ math.sqrt(16) }}"), "4.0");
        assert_eq!(render("{{ math.pow(2, 10) }}"), "1024.0");
        assert_eq!(render("{{ math.log(1) }}"), "0.0");
        assert!(render("{{ math.pi }}").starts_with("3.14159"));
    }

    #[test]
    fn test_math_floor_beyond_i64_keeps_magnitude() {
        let out = render("{{ math.floor(1e300) }}");
        assert_ne!(out, i64::MAX.to_string());
        assert_eq!(out.parse::<f64>().unwrap(), 1e300);
        assert_eq!(render("{{ math.ceil(-1e19) }}").parse::<f64>().unwrap(), -1e19);
    }

    #[test]
    fn test_math_domain_error() {
        assert!(env().render_str("{{ math.sqrt(-1) }}", ()).is_err());
    }

    #[test]
    fn test_unknown_method() {
        let err = env().render_str("{{ math.nope(1) }}", ()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownMethod);
    }

    #[test]
    fn test_modules_render_as_names() {
        assert_eq!(render("{{ math }}"), "<module 'math'>");
    }
}
