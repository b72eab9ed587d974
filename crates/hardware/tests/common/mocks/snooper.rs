use mesi_core::common::{Addr, Cycle};
use mesi_core::protocol::{BusRequest, BusTransaction, SnoopReply, SnoopSummary, Snooper};
use mesi_core::stats::SimStats;
use mockall::mock;

mock! {
    pub SnoopAgent {}
    impl Snooper for SnoopAgent {
        fn core_id(&self) -> usize;
        fn snoop(
            &mut self,
            kind: BusTransaction,
            addr: Addr,
            cycle: Cycle,
            stats: &mut SimStats,
        ) -> SnoopReply;
        fn complete(&mut self, request: &BusRequest, summary: &SnoopSummary, cycle: Cycle);
    }
}

/// A mock that answers for `core` and contributes nothing to snoops.
pub fn passive_agent(core: usize) -> MockSnoopAgent {
    let mut agent = MockSnoopAgent::new();
    agent.expect_core_id().return_const(core);
    agent
        .expect_snoop()
        .returning(|_, _, _, _| SnoopReply::default());
    agent.expect_complete().return_const(());
    agent
}
