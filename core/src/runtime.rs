use rayon::ThreadPoolBuilder;
use std::env;
use std::sync::OnceLock;

static THREAD_POOL_INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Initialize the global Rayon thread pool used by CPU-parallel routines.
///
/// Priority:
/// 1. `num_threads` argument
/// 2. `AEROLOC_CPU_THREADS` environment variable
/// 3. Rayon default
pub fn init_global_thread_pool(num_threads: Option<usize>) -> Result<(), String> {
    let res = THREAD_POOL_INIT.get_or_init(|| {
        let configured_threads = match num_threads {
            Some(n) => Some(n),
            None => read_cpu_threads_from_env()?,
        };

        let mut builder = ThreadPoolBuilder::new();
        if let Some(n) = configured_threads {
            if n == 0 {
                return Err("AEROLOC_CPU_THREADS must be >= 1".to_string());
            }
            builder = builder.num_threads(n);
        }

        builder.build_global().map_err(|e| e.to_string())
    });
    res.clone()
}

pub fn current_cpu_threads() -> usize {
    rayon::current_num_threads()
}

fn read_cpu_threads_from_env() -> Result<Option<usize>, String> {
    let raw = match env::var("AEROLOC_CPU_THREADS") {
        Ok(v) => v,
        Err(env::VarError::NotPresent) => return Ok(None),
        Err(e) => return Err(format!("failed to read AEROLOC_CPU_THREADS: {e}")),
    };

    let parsed: usize = raw
        .parse()
        .map_err(|_| format!("AEROLOC_CPU_THREADS must be a positive integer, got '{raw}'"))?;
    if parsed == 0 {
        return Err("AEROLOC_CPU_THREADS must be >= 1".to_string());
    }
    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_returns_the_first_result() {
        let first = init_global_thread_pool(None);
        let second = init_global_thread_pool(Some(2));
        assert_eq!(first, second);
        assert!(current_cpu_threads() >= 1);
    }

    #[test]
    fn env_override_is_validated() {
        // One test owns the env var; it is process-global.
        env::set_var("AEROLOC_CPU_THREADS", "0");
        assert!(read_cpu_threads_from_env().is_err());

        env::set_var("AEROLOC_CPU_THREADS", "four");
        assert!(read_cpu_threads_from_env().is_err());

        env::set_var("AEROLOC_CPU_THREADS", "4");
        assert_eq!(read_cpu_threads_from_env(), Ok(Some(4)));

        env::remove_var("AEROLOC_CPU_THREADS");
        assert_eq!(read_cpu_threads_from_env(), Ok(None));
    }
}
