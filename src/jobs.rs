pub mod period_sweeper;
