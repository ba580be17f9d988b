//! the test_utils folder here will share utils or test components between
//! unit tests
mod common;
mod fake_transport;

pub(crate) use common::*;
pub(crate) use fake_transport::*;
