//! Command-flavoured cache key construction.
//!
//! Kept free of any dependency on a concrete "command" type so the cache
//! crate never has to depend back on the executor crate that uses it
//! (see DESIGN.md, "cyclic references" note, mirrored from the teacher's
//! capability-injection pattern for the Tracker/Worker relationship).

use serde_json::Value;

/// Build the memoization key for a command result: `pretty(root args...) +
/// JSON(options)`, after the caller has already stripped any per-call TTL
/// override and minimised the `env` portion of `options` (spec §4.4/§4.2).
pub fn command_key(root: &str, args: &[String], options: &Value) -> String {
    let pretty = if args.is_empty() {
        root.to_string()
    } else {
        format!("{} {}", root, args.join(" "))
    };
    format!("{pretty}{}", options)
}

/// Minimise the `env` object of an options payload to just its keys (spec
/// §4.2: "The `env` portion of options is minimised before hashing").
pub fn minimise_env(mut options: Value) -> Value {
    if let Some(obj) = options.as_object_mut() {
        if let Some(env) = obj.get_mut("env") {
            if let Some(env_obj) = env.as_object() {
                let keys: Vec<Value> = env_obj.keys().map(|k| Value::String(k.clone())).collect();
                *env = Value::Array(keys);
            }
        }
        obj.remove("ttlMs");
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_ttl_and_minimises_env() {
        let opts = json!({"ttlMs": 5000, "env": {"HOME": "/root", "USER": "x"}, "timeoutSec": 30});
        let cleaned = minimise_env(opts);
        assert!(cleaned.get("ttlMs").is_none());
        let env = cleaned.get("env").unwrap().as_array().unwrap();
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn command_key_includes_args_and_options() {
        let key1 = command_key("dotnet", &["--list-sdks".into()], &json!({}));
        let key2 = command_key("dotnet", &["--list-runtimes".into()], &json!({}));
        assert_ne!(key1, key2);
    }
}
