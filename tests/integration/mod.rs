mod helpers;

mod test_branches;
mod test_mcp;
mod test_offline;
mod test_plans;
