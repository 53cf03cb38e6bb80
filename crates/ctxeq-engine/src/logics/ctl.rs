//! CTL: CTL-SAT answers without a model.

use ctxeq_dsl::Formula;
use ctxeq_smt::ctlsat::CtlSatEncoder;
use ctxeq_smt::OracleError;
use tracing::debug;

use crate::oracles::OracleSet;
use crate::result::Counterexample;

pub fn find_difference(
    oracles: &mut dyn OracleSet,
    left: &Formula,
    condition: Option<&Formula>,
    right: &Formula,
) -> Result<Option<Counterexample>, OracleError> {
    let query = CtlSatEncoder::new().difference_query(left, condition, right)?;
    debug!(%query, "CTL-SAT query");
    let satisfiable = oracles.ctl()?.is_satisfiable(&query)?;
    Ok(satisfiable.then_some(Counterexample::Opaque))
}
