//! CSV adapters used by the command line: member lists in, schedules and round
//! ledgers out.

pub mod member_reader;
pub mod round_writer;
pub mod schedule_writer;
