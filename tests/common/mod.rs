pub mod fake_native;
