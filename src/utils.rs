use uuid::Uuid;

/// Log a titled step and how long it took
#[macro_export]
macro_rules! step {
  ($name:expr, $($tail:tt)*) => {
    {
      log::debug!("* {}", $name);
      let now = std::time::Instant::now();
      let value = $($tail)*;
      log::debug!("Done  `{}` ({} ms)", $name, now.elapsed().as_millis());
      value
    }
  };
}

/// Client-side id, e.g. `post_3f2a...`
pub fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}
