mod lifecycle;

#[cfg(test)]
mod test_utils;

pub use lifecycle::Session;
