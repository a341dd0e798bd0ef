//! Built-in Rhai functions available to filter scripts.

use rhai::{Dynamic, Engine, Map};

/// Registers all built-in functions in the Rhai engine.
pub fn register_builtin_functions(engine: &mut Engine) {
    register_id_functions(engine);
    register_time_functions(engine);
    register_parsing_functions(engine);
    register_string_functions(engine);
    register_json_functions(engine);
}

fn register_id_functions(engine: &mut Engine) {
    engine.register_fn("uuid", || uuid::Uuid::new_v4().to_string());
}

fn register_time_functions(engine: &mut Engine) {
    // RFC 3339, UTC
    engine.register_fn("timestamp", || chrono::Utc::now().to_rfc3339());

    engine.register_fn("unix_timestamp", || chrono::Utc::now().timestamp());

    engine.register_fn("unix_timestamp_ms", || {
        chrono::Utc::now().timestamp_millis()
    });

    // RFC 3339 string to unix milliseconds, () if unparseable
    engine.register_fn("parse_timestamp", |s: &str| -> Dynamic {
        chrono::DateTime::parse_from_rfc3339(s)
            .map(|ts| Dynamic::from(ts.timestamp_millis()))
            .unwrap_or(Dynamic::UNIT)
    });
}

fn register_parsing_functions(engine: &mut Engine) {
    // Unlike the standard versions these return () instead of throwing
    engine.register_fn("parse_int", |s: &str| -> Dynamic {
        s.trim().parse::<i64>().map(Dynamic::from).unwrap_or(Dynamic::UNIT)
    });

    engine.register_fn("parse_float", |s: &str| -> Dynamic {
        s.trim().parse::<f64>().map(Dynamic::from).unwrap_or(Dynamic::UNIT)
    });

    engine.register_fn("parse_bool", |s: &str| -> Dynamic {
        match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Dynamic::from(true),
            "false" | "0" | "no" | "off" => Dynamic::from(false),
            _ => Dynamic::UNIT,
        }
    });
}

fn register_string_functions(engine: &mut Engine) {
    engine.register_fn("to_lowercase", |s: &str| s.to_lowercase());
    engine.register_fn("to_uppercase", |s: &str| s.to_uppercase());
    engine.register_fn("str_contains", |s: &str, pattern: &str| s.contains(pattern));
    engine.register_fn("starts_with", |s: &str, prefix: &str| s.starts_with(prefix));
    engine.register_fn("ends_with", |s: &str, suffix: &str| s.ends_with(suffix));
}

fn register_json_functions(engine: &mut Engine) {
    // Compact JSON text for any value, () if it has no JSON form
    engine.register_fn("to_json", |value: Dynamic| -> Dynamic {
        rhai::serde::from_dynamic::<serde_json::Value>(&value)
            .ok()
            .and_then(|json| serde_json::to_string(&json).ok())
            .map(Dynamic::from)
            .unwrap_or(Dynamic::UNIT)
    });

    // Parse JSON text, () if invalid
    engine.register_fn("parse_json", |s: &str| -> Dynamic {
        serde_json::from_str::<serde_json::Value>(s)
            .ok()
            .and_then(|json| rhai::serde::to_dynamic(json).ok())
            .unwrap_or(Dynamic::UNIT)
    });

    // Dotted lookup into nested maps, () if any segment is missing
    engine.register_fn("get_path", |map: Map, path: &str| -> Dynamic {
        get_path(&map, path)
    });
}

fn get_path(map: &Map, path: &str) -> Dynamic {
    let mut segments = path.split('.');
    let Some(first) = segments.next() else {
        return Dynamic::UNIT;
    };
    let Some(mut current) = map.get(first).cloned() else {
        return Dynamic::UNIT;
    };

    for segment in segments {
        let next = match current.read_lock::<Map>() {
            Some(inner) => inner.get(segment).cloned(),
            None => None,
        };
        match next {
            Some(value) => current = value,
            None => return Dynamic::UNIT,
        }
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_engine() -> Engine {
        let mut engine = Engine::new();
        register_builtin_functions(&mut engine);
        engine
    }

    #[test]
    fn test_uuid() {
        let engine = create_engine();
        let result: String = engine.eval("uuid()").unwrap();
        assert_eq!(result.len(), 36);
        assert!(uuid::Uuid::parse_str(&result).is_ok());
    }

    #[test]
    fn test_timestamp() {
        let engine = create_engine();
        let result: String = engine.eval("timestamp()").unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&result).is_ok());

        let result: i64 = engine.eval("unix_timestamp()").unwrap();
        assert!(result > 1_700_000_000);

        let result: i64 = engine.eval("unix_timestamp_ms()").unwrap();
        assert!(result > 1_700_000_000_000);
    }

    #[test]
    fn test_parse_timestamp() {
        let engine = create_engine();

        let result: i64 = engine
            .eval(r#"parse_timestamp("2024-01-01T00:00:00Z")"#)
            .unwrap();
        assert_eq!(result, 1_704_067_200_000);

        let result: Dynamic = engine.eval(r#"parse_timestamp("yesterday")"#).unwrap();
        assert!(result.is_unit());
    }

    #[test]
    fn test_parse_int() {
        let engine = create_engine();

        let result: i64 = engine.eval(r#"parse_int(" 42 ")"#).unwrap();
        assert_eq!(result, 42);

        let result: Dynamic = engine.eval(r#"parse_int("forty-two")"#).unwrap();
        assert!(result.is_unit());
    }

    #[test]
    fn test_parse_float_and_bool() {
        let engine = create_engine();

        let result: f64 = engine.eval(r#"parse_float("2.5")"#).unwrap();
        assert!((result - 2.5).abs() < f64::EPSILON);

        let result: bool = engine.eval(r#"parse_bool("YES")"#).unwrap();
        assert!(result);

        let result: Dynamic = engine.eval(r#"parse_bool("maybe")"#).unwrap();
        assert!(result.is_unit());
    }

    #[test]
    fn test_string_functions() {
        let engine = create_engine();

        let result: String = engine.eval(r#"to_uppercase("warn")"#).unwrap();
        assert_eq!(result, "WARN");

        let result: bool = engine
            .eval(r#"str_contains("connection reset", "reset")"#)
            .unwrap();
        assert!(result);

        let result: bool = engine.eval(r#"ends_with("app.log", ".log")"#).unwrap();
        assert!(result);
    }

    #[test]
    fn test_to_json() {
        let engine = create_engine();
        let result: String = engine.eval(r#"to_json(#{a: 1, b: [true, "x"]})"#).unwrap();
        assert_eq!(result, r#"{"a":1,"b":[true,"x"]}"#);
    }

    #[test]
    fn test_parse_json() {
        let engine = create_engine();

        let result: i64 = engine.eval(r#"parse_json("{\"n\": 7}").n"#).unwrap();
        assert_eq!(result, 7);

        let result: Dynamic = engine.eval(r#"parse_json("{broken")"#).unwrap();
        assert!(result.is_unit());
    }

    #[test]
    fn test_get_path() {
        let engine = create_engine();

        let result: String = engine
            .eval(r#"get_path(#{http: #{request: #{method: "GET"}}}, "http.request.method")"#)
            .unwrap();
        assert_eq!(result, "GET");

        let result: Dynamic = engine
            .eval(r#"get_path(#{http: #{}}, "http.response.status")"#)
            .unwrap();
        assert!(result.is_unit());

        let result: Dynamic = engine.eval(r#"get_path(#{a: 1}, "a.b")"#).unwrap();
        assert!(result.is_unit());
    }
}
