//! Orchestrator operation tests

mod guild_tests;
