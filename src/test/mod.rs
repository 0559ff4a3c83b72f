mod support;

mod cluster;
mod driver;
mod ledger;
mod scenario_spec;
mod vnode_id;
