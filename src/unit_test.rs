use std::{
    fs,
    thread::available_parallelism,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use clap::Parser;
use quanta::Clock;
use rand::{rngs::StdRng, SeedableRng};
use serial_test::serial;

use crate::{
    benchmark::{
        bencher::{Bencher, Workload},
        payload::PayloadSource,
        push_pop::push_pop_benchmark,
        records::{RecordWriter, Records},
        report::{Contention, LatencySamples, LatencySummary, RunOutcome, LATENCY_SAMPLES},
    },
    command_parser::{stack_target::StackTarget, App},
    error::BenchError,
};

const ITERATION: u64 = 10_000;

fn cpu_count() -> usize {
    available_parallelism().map(|n| n.get()).unwrap_or(1)
}

fn bencher(num_thread: usize, workload: Workload, stat_latency: bool) -> Bencher {
    Bencher::new(
        cpu_count(),
        num_thread,
        StackTarget::to_vec(),
        workload,
        stat_latency,
        false,
        Clock::new(),
    )
    .unwrap()
}

#[test]
pub fn contention_label_follows_thread_count() {
    assert_eq!(Contention::from_threads(1), Contention::LowContention);
    assert_eq!(Contention::from_threads(2), Contention::HighContention);
    assert_eq!(Contention::from_threads(4).to_string(), "HighContention");
}

#[test]
pub fn report_line_format() {
    let outcome = RunOutcome {
        target: StackTarget::Guarded,
        contention: Contention::HighContention,
        num_thread: 4,
        elapsed: Duration::from_millis(12),
        pairs: 4_000,
        cas_stat: None,
        latency: None,
    };

    assert_eq!(outcome.to_string(), "Guarded HighContention 4 took 12ms");
    assert_eq!(outcome.pairs_per_sec().round(), (4_000.0f64 / 0.012).round());
}

#[test]
pub fn latency_summary() {
    assert_eq!(LatencySummary::merge([LatencySamples::default()].iter()), None);

    let mut first = LatencySamples::default();
    first.record(10);
    first.record(20);
    let mut second = LatencySamples::default();
    second.record(60);

    let summary = LatencySummary::merge([first, second].iter()).unwrap();
    assert_eq!(summary.samples, 3);
    assert_eq!(summary.mean, Duration::from_nanos(30));
    assert_eq!(summary.max, Duration::from_nanos(60));
}

#[test]
pub fn latency_samples_stay_bounded() {
    let total = 10 * LATENCY_SAMPLES as u64 + 3;
    let mut samples = LatencySamples::default();
    for nanos in 0..total {
        samples.record(nanos);
    }

    assert_eq!(samples.count(), total);
    assert_eq!(samples.mean(), Some(Duration::from_nanos((total - 1) / 2)));
    assert!(samples.kept().len() <= LATENCY_SAMPLES);
    assert!(samples.kept().len() > LATENCY_SAMPLES / 2);
    // thinning keeps an even spread starting from the first pair
    assert_eq!(samples.kept()[0], 0);
    let stride = samples.kept()[1] - samples.kept()[0];
    assert!(samples.kept().windows(2).all(|w| w[1] - w[0] == stride));

    let summary = LatencySummary::merge([samples].iter()).unwrap();
    assert_eq!(summary.max, Duration::from_nanos(total - 1));
}

#[test]
pub fn payload_source_from_seeded_rng() {
    let mut a = StdRng::seed_from_u64(7);
    let mut b = StdRng::seed_from_u64(7);

    for _ in 0..16 {
        assert_eq!(a.next_payload(), b.next_payload());
    }
}

#[test]
pub fn rejects_invalid_configuration() {
    let clock = Clock::new();
    let targets = StackTarget::to_vec();

    assert!(matches!(
        Bencher::new(1, 0, targets.clone(), Workload::Ops(1), false, false, clock.clone()),
        Err(BenchError::ZeroThreads)
    ));
    assert!(matches!(
        Bencher::new(1, 1, targets.clone(), Workload::Ops(0), false, false, clock.clone()),
        Err(BenchError::ZeroOps)
    ));
    assert!(matches!(
        Bencher::new(
            1,
            1,
            targets.clone(),
            Workload::Duration(Duration::ZERO),
            false,
            false,
            clock.clone()
        ),
        Err(BenchError::ZeroDuration)
    ));
    assert!(matches!(
        Bencher::new(0, 1, targets, Workload::Ops(1), false, false, clock),
        Err(BenchError::ZeroCpus)
    ));
}

#[test]
pub fn command_line_options() {
    let app = App::try_parse_from(["stackbench"]).unwrap();
    let opts = &app.global_opts;
    assert_eq!(opts.threads, vec![1, 4]);
    assert_eq!(opts.targets(), vec![StackTarget::Naive, StackTarget::Guarded]);
    assert_eq!(opts.workload(), Workload::Ops(1_000_000));
    assert_eq!(opts.cpu_counts().unwrap().len(), 2);

    let app = App::try_parse_from([
        "stackbench",
        "--targets",
        "guarded",
        "--threads",
        "1,2,8",
        "--cpus",
        "2",
        "--duration",
        "3",
    ])
    .unwrap();
    let opts = &app.global_opts;
    assert_eq!(opts.targets(), vec![StackTarget::Guarded]);
    assert_eq!(opts.cpu_counts().unwrap(), vec![2, 2, 2]);
    assert_eq!(opts.workload(), Workload::Duration(Duration::from_secs(3)));

    let app = App::try_parse_from(["stackbench", "--threads", "1,4", "--cpus", "1,2,3"]).unwrap();
    assert!(matches!(
        app.global_opts.cpu_counts(),
        Err(BenchError::CpuThreadMismatch { cpus: 3, threads: 2 })
    ));

    assert!(App::try_parse_from(["stackbench", "--targets", "bogus"]).is_err());

    let mut app = App::try_parse_from(["stackbench"]).unwrap();
    app.global_opts.threads.clear();
    assert!(matches!(
        app.global_opts.cpu_counts(),
        Err(BenchError::NoThreadCounts)
    ));
}

#[test]
#[serial]
pub fn fixed_ops_runs_conserve_nodes() {
    for num_thread in [1, 4] {
        let bencher = bencher(num_thread, Workload::Ops(ITERATION), false);

        for target in StackTarget::to_vec() {
            let (outcome, records) = push_pop_benchmark(
                &bencher,
                target,
                |id| StdRng::seed_from_u64(id as u64),
            )
            .unwrap();

            assert_eq!(outcome.target, target);
            assert_eq!(outcome.num_thread, num_thread);
            assert_eq!(outcome.contention, Contention::from_threads(num_thread));
            assert_eq!(outcome.pairs, ITERATION * num_thread as u64);
            assert_eq!(records.len(), num_thread);

            for record in &records {
                assert_eq!(record.push_count, ITERATION);
                assert_eq!(record.pop_count, ITERATION);
                assert_eq!(record.empty_pops, 0);
                assert_eq!(record.target, target.to_string());
                assert_eq!(record.thread_num, num_thread);
            }

            if let Some(stat) = outcome.cas_stat {
                assert_eq!(stat.successes(), 2 * outcome.pairs);
                assert_eq!(records[0].cas_attempts, Some(stat.attempts));
            }
        }
    }
}

#[test]
#[serial]
pub fn duration_runs_stop_between_iterations() {
    let bencher = bencher(2, Workload::Duration(Duration::from_millis(50)), true);

    for target in StackTarget::to_vec() {
        let (outcome, records) =
            push_pop_benchmark(&bencher, target, |id| StdRng::seed_from_u64(id as u64)).unwrap();

        assert!(outcome.elapsed >= Duration::from_millis(50));
        assert!(outcome.pairs > 0);
        let latency = outcome.latency.unwrap();
        assert_eq!(latency.samples, outcome.pairs);

        for record in &records {
            assert_eq!(record.latencies.count(), record.pop_count);
            assert!(record.latencies.kept().len() <= LATENCY_SAMPLES);
        }
    }
}

#[test]
#[serial]
pub fn mock_clock_drives_reported_time() {
    let (clock, _mock) = Clock::mock();
    let bencher = Bencher::new(
        1,
        4,
        vec![StackTarget::Naive],
        Workload::Ops(ITERATION),
        false,
        false,
        clock,
    )
    .unwrap();

    let outcomes = bencher.benchmark(None).unwrap();

    assert_eq!(outcomes[0].elapsed, Duration::ZERO);
    assert_eq!(outcomes[0].to_string(), "Naive HighContention 4 took 0ns");
}

#[test]
#[serial]
pub fn records_are_written_as_csv() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let output_path = std::env::temp_dir().join(format!("stackbench-{}", nanos));

    let bencher = bencher(2, Workload::Ops(1_000), false);
    let mut writer = RecordWriter::create(&output_path, "push_pop").unwrap();
    bencher.benchmark(Some(&mut writer)).unwrap();
    writer.finish().unwrap();

    let mut reader = csv::Reader::from_path(output_path.join("push_pop.csv")).unwrap();
    let rows = reader
        .deserialize::<Records>()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    // two variants, two workers each
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.pop_count == 1_000));
    assert_eq!(rows.iter().filter(|r| r.target == "Naive").count(), 2);
    assert_eq!(rows[0].contention, "HighContention");

    fs::remove_dir_all(output_path).unwrap();
}
