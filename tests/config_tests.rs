use edu_portal::{AppConfig, config::Env};
use serial_test::serial;
use std::{env, panic};

// --- Setup/Teardown Utilities ---

/// Utility to run a test function and restore environment variables afterward
fn run_with_env<T, R>(test: T, cleanup_vars: Vec<&'static str>) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    // Save current environment variables
    let originals: Vec<(String, Option<String>)> = cleanup_vars
        .iter()
        .map(|&var| (var.to_string(), env::var(var).ok()))
        .collect();

    // Run the test
    let result = panic::catch_unwind(test);

    // Restore original environment variables
    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(&key, val);
            } else {
                env::remove_var(&key);
            }
        }
    }

    // Re-panic if the test failed
    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

const ALL_VARS: &[&str] = &[
    "APP_ENV",
    "BACKEND_API_URL",
    "SUPABASE_URL",
    "SUPABASE_ANON_KEY",
    "S3_ACCESS_KEY",
    "S3_SECRET_KEY",
    "S3_BUCKET_NAME",
    "SUPABASE_JWT_SECRET",
];

// --- Tests ---

#[test]
#[serial]
fn production_config_fails_fast_on_missing_secrets() {
    // We expect this to panic because the storage credentials are not set.
    let result = panic::catch_unwind(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("SUPABASE_URL", "http://fake-url.com");
            env::set_var("SUPABASE_ANON_KEY", "anon");
            env::set_var("BACKEND_API_URL", "http://backend.internal");
            env::set_var("SUPABASE_JWT_SECRET", "prod-secret");
        }
        // S3_ACCESS_KEY and S3_SECRET_KEY are missing
        AppConfig::load()
    });

    unsafe {
        for var in ALL_VARS {
            env::remove_var(var);
        }
    }

    assert!(
        result.is_err(),
        "Production config loading should panic on missing secrets"
    );
}

#[test]
#[serial]
fn production_config_requires_the_jwt_secret() {
    let result = panic::catch_unwind(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::remove_var("SUPABASE_JWT_SECRET");
        }
        AppConfig::load()
    });

    unsafe {
        for var in ALL_VARS {
            env::remove_var(var);
        }
    }

    assert!(
        result.is_err(),
        "Production config loading should panic without SUPABASE_JWT_SECRET"
    );
}

#[test]
#[serial]
fn local_config_falls_back_to_development_defaults() {
    // Local mode should not panic, and should use hardcoded defaults
    let config = run_with_env(
        || {
            unsafe {
                env::set_var("APP_ENV", "local");
                // Clear other variables to test fallbacks
                for var in &ALL_VARS[1..] {
                    env::remove_var(var);
                }
            }
            AppConfig::load()
        },
        ALL_VARS.to_vec(),
    );

    assert_eq!(config.env, Env::Local);
    // Check hardcoded MinIO default
    assert_eq!(config.s3_endpoint, "http://localhost:9000");
    // Check local JWT secret fallback
    assert_eq!(config.jwt_secret, "super-secure-test-secret-value-local");
    // The backend API defaults to the local instance.
    assert_eq!(config.backend_api_url, "http://localhost:4000");
    assert_eq!(config.provider_url, "http://localhost:54321");
}

#[test]
#[serial]
fn production_storage_endpoint_is_derived_from_the_provider_url() {
    let config = run_with_env(
        || {
            unsafe {
                env::set_var("APP_ENV", "production");
                env::set_var("SUPABASE_URL", "https://project.supabase.co");
                env::set_var("SUPABASE_ANON_KEY", "anon");
                env::set_var("BACKEND_API_URL", "https://api.portal.example");
                env::set_var("SUPABASE_JWT_SECRET", "prod-secret");
                env::set_var("S3_ACCESS_KEY", "key");
                env::set_var("S3_SECRET_KEY", "secret");
                env::remove_var("S3_BUCKET_NAME");
            }
            AppConfig::load()
        },
        ALL_VARS.to_vec(),
    );

    assert_eq!(config.env, Env::Production);
    assert_eq!(
        config.s3_endpoint,
        "https://project.supabase.co/storage/v1/s3"
    );
    // Bucket falls back to the shared default name.
    assert_eq!(config.s3_bucket, "edu-uploads");
}
