//=============================================
// solvra_expr/vm/tests/mod.rs
//=============================================
// Purpose: In-crate VM test suites.
//=============================================
