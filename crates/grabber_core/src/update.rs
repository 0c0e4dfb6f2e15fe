use crate::{extract_links, CycleState, Effect, Msg, Phase, RunMode};

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages that do not fit the current phase are ignored.
pub fn update(mut state: CycleState, msg: Msg) -> (CycleState, Vec<Effect>) {
    let effects = match (state.phase(), msg) {
        (Phase::Idle, Msg::Start) | (Phase::Countdown, Msg::CountdownElapsed) => {
            begin_cycle(&mut state)
        }
        (Phase::Fetching, Msg::PageFetched { body }) => {
            let links = extract_links(&body, state.target().site);
            state.report_mut().links_found = links.len();
            if links.is_empty() {
                finish_cycle(&mut state)
            } else {
                state.set_phase(Phase::Downloading {
                    pending: links.len(),
                });
                vec![Effect::DispatchDownloads { links }]
            }
        }
        (Phase::Fetching, Msg::PageFetchFailed { reason }) => {
            state.report_mut().page_error = Some(reason);
            finish_cycle(&mut state)
        }
        (Phase::Downloading { pending }, Msg::DownloadFinished(outcome)) => {
            state.report_mut().tally(&outcome);
            let pending = pending.saturating_sub(1);
            if pending == 0 {
                finish_cycle(&mut state)
            } else {
                state.set_phase(Phase::Downloading { pending });
                Vec::new()
            }
        }
        _ => Vec::new(),
    };

    (state, effects)
}

fn begin_cycle(state: &mut CycleState) -> Vec<Effect> {
    state.start_next_cycle();
    vec![Effect::FetchPage {
        url: state.target().source_url.clone(),
    }]
}

fn finish_cycle(state: &mut CycleState) -> Vec<Effect> {
    let report = state.take_report();
    match state.mode() {
        RunMode::SinglePass => {
            state.set_phase(Phase::Done);
            vec![Effect::ReportCycle(report), Effect::Finish]
        }
        RunMode::Monitor { interval_secs } => {
            state.set_phase(Phase::Countdown);
            vec![
                Effect::ReportCycle(report),
                Effect::StartCountdown {
                    seconds: interval_secs,
                },
            ]
        }
    }
}
