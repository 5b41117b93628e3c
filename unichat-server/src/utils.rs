#[cfg(test)]
pub mod test_client;
