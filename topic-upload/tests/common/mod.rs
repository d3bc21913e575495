pub mod fakes;
pub mod mock_bot;
