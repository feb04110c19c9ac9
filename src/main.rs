use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use indicatif::{ProgressBar, ProgressStyle};
use slope_search::core::search::{LogObserver, RoundReport};
use slope_search::{
    presets, run_sweep, CancellationToken, ParameterSet, ResultLog, SearchConfig, SearchDriver,
    SearchError, SearchObserver, SearchOutcome, SlopeSweep,
};
use std::fs;
use std::process;
use std::time::Instant;

fn build_cli() -> Command {
    Command::new("slope_search")
        .version(env!("CARGO_PKG_VERSION"))
        .about("다단 1차 필터로 목표 dB/decade 기울기를 내는 파라미터 탐색")
        .arg(
            Arg::new("start")
                .long("start")
                .value_name("SLOPE")
                .help("첫 목표 기울기 (dB/decade)")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(f64))
                .default_value("0"),
        )
        .arg(
            Arg::new("end")
                .long("end")
                .value_name("SLOPE")
                .help("마지막 목표 기울기 (포함)")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(f64))
                .default_value("-10"),
        )
        .arg(
            Arg::new("step")
                .long("step")
                .value_name("STEP")
                .help("목표 간격. 시작에서 끝 방향이어야 함")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(f64))
                .default_value("-1"),
        )
        .arg(
            Arg::new("branching")
                .long("branching")
                .short('b')
                .value_name("COUNT")
                .help("라운드당 후보 수")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("iteration-cap")
                .long("iteration-cap")
                .value_name("ROUNDS")
                .help("기울기 하나당 최대 라운드")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("spin-cap")
                .long("spin-cap")
                .value_name("ROUNDS")
                .help("개선 없이 버틸 수 있는 연속 라운드")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("step-multiplier")
                .long("step-multiplier")
                .value_name("FACTOR")
                .help("비용 대비 교란 보폭 계수")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("max-slope-error")
                .long("max-slope-error")
                .value_name("DB")
                .help("허용 기울기 오차 (dB/decade)")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("max-error")
                .long("max-error")
                .value_name("DB")
                .help("허용 잔차")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .short('j')
                .value_name("THREADS")
                .help("평가 스레드 수 (기본: CPU 코어 수)")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("SEED")
                .help("난수 시드 (재현용)")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("seed-trials")
                .long("seed-trials")
                .value_name("COUNT")
                .help("탐색 전에 시도할 무작위 이득 시드 수")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("results")
                .long("results")
                .short('o')
                .value_name("FILE")
                .help("결과 기록 JSON 파일")
                .default_value("slope_results.json"),
        )
        .arg(
            Arg::new("preset")
                .long("preset")
                .value_name("NAME")
                .help("첫 기울기의 시드 파라미터 (white, pink, red)")
                .default_value("white"),
        )
        .arg(
            Arg::new("tune-knees")
                .long("tune-knees")
                .help("무릎 주파수도 탐색")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("탐색 구성 JSON (명령행 옵션이 우선)"),
        )
}

/// 파일 구성 위에 명령행에서 준 값만 덮어쓴다
fn load_config(matches: &ArgMatches) -> Result<SearchConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path))?;
            SearchConfig::from_json(&text)
                .with_context(|| format!("failed to parse config file {}", path))?
        }
        None => SearchConfig::default(),
    };

    if let Some(&value) = matches.get_one::<usize>("branching") {
        config.branching_factor = value;
    }
    if let Some(&value) = matches.get_one::<usize>("iteration-cap") {
        config.iteration_cap = value;
    }
    if let Some(&value) = matches.get_one::<usize>("spin-cap") {
        config.spin_cap = value;
    }
    if let Some(&value) = matches.get_one::<f64>("step-multiplier") {
        config.perturbation.step_multiplier = value;
    }
    if let Some(&value) = matches.get_one::<f64>("max-slope-error") {
        config.convergence.max_slope_error = value;
    }
    if let Some(&value) = matches.get_one::<f64>("max-error") {
        config.convergence.max_error = value;
    }
    if let Some(&value) = matches.get_one::<usize>("workers") {
        config.workers = value;
    }
    if let Some(&value) = matches.get_one::<u64>("seed") {
        config.seed = Some(value);
    }
    if let Some(&value) = matches.get_one::<usize>("seed-trials") {
        config.seed_trials = value;
    }
    if matches.get_flag("tune-knees") {
        config.perturbation.tune_knees = true;
    }

    config.validate().context("invalid search configuration")?;
    Ok(config)
}

/// 스윕 진행 막대. 상세 로그는 `LogObserver` 에 넘긴다.
struct ProgressObserver {
    bar: ProgressBar,
    log: LogObserver,
}

impl ProgressObserver {
    fn new(targets: usize) -> Result<Self> {
        let bar = ProgressBar::new(targets as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40}] {pos}/{len} 기울기 {msg}")
                .context("invalid progress template")?,
        );
        Ok(Self {
            bar,
            log: LogObserver::default(),
        })
    }
}

impl SearchObserver for ProgressObserver {
    fn on_slope_start(&mut self, target_slope: f64) {
        self.bar.set_message(format!("{:.2} 탐색 시작", target_slope));
        self.log.on_slope_start(target_slope);
    }

    fn on_round(&mut self, report: &RoundReport<'_>) {
        self.bar.set_message(format!(
            "{:.2}: 라운드 {} 비용 {:.4} 기울기 {:.3} 압력 {}",
            report.target_slope,
            report.iteration,
            report.best_cost,
            report.fitted_slope,
            report.pressure
        ));
        self.log.on_round(report);
    }

    fn on_slope_done(&mut self, outcome: &SearchOutcome) {
        self.bar.inc(1);
        self.log.on_slope_done(outcome);
    }

    fn on_slope_skipped(&mut self, target_slope: f64, params: &ParameterSet) {
        self.bar.inc(1);
        self.log.on_slope_skipped(target_slope, params);
    }
}

fn print_parameters(slope: f64, params: &ParameterSet) {
    let stages: Vec<String> = params
        .iter()
        .map(|stage| format!("({:.1} Hz, {:.6})", stage.knee_frequency, stage.gain))
        .collect();
    println!("   {:>8.3} dB/decade: {}", slope, stages.join(", "));
}

fn run() -> Result<()> {
    let matches = build_cli().get_matches();
    let config = load_config(&matches)?;

    let start = *matches.get_one::<f64>("start").context("missing --start")?;
    let end = *matches.get_one::<f64>("end").context("missing --end")?;
    let step = *matches.get_one::<f64>("step").context("missing --step")?;
    let sweep = SlopeSweep::new(start, end, step).context("invalid slope range")?;

    let preset = matches.get_one::<String>("preset").context("missing --preset")?;
    let seed = presets::by_name(preset)?;

    let results_path = matches.get_one::<String>("results").context("missing --results")?;
    let mut results = ResultLog::open(results_path)
        .with_context(|| format!("failed to open result log {}", results_path))?;

    let cancel = CancellationToken::new();
    let cancel_for_ctrlc = cancel.clone();
    ctrlc::set_handler(move || {
        cancel_for_ctrlc.cancel();
    })
    .context("failed to install Ctrl-C handler")?;

    let evaluator = config.grid.build_evaluator()?;
    let workers = config.effective_workers();
    let targets = sweep.targets();

    println!("🔍 기울기 탐색 시작:");
    println!("   구간: {} → {} (간격 {}, 목표 {}개)", start, end, step, targets.len());
    println!("   시드: {} ({}단)", preset, seed.len());
    println!("   후보/라운드: {}, 워커: {}", config.branching_factor, workers);
    println!("   기록 파일: {} (기존 {}개)", results_path, results.len());

    let mut driver = SearchDriver::new(config, evaluator)?.with_cancellation(cancel);
    let mut observer = ProgressObserver::new(targets.len())?;

    let started = Instant::now();
    let outcome = run_sweep(&mut driver, &sweep, &seed, &mut results, &mut observer);
    observer.bar.finish_and_clear();

    match outcome {
        Ok(report) => {
            println!("\n🏆 탐색 완료 ({:.2}초)", started.elapsed().as_secs_f64());
            println!("   새로 탐색: {}, 건너뜀: {}, 라운드 합계: {}", report.searched, report.skipped, report.rounds);
            for (slope, params) in &report.results {
                print_parameters(*slope, params);
            }
            Ok(())
        }
        Err(SearchError::Cancelled) => {
            println!("\n⏹️ 중단됨. 완료된 기울기 {}개는 {} 에 저장되어 있습니다.", results.len(), results_path);
            Ok(())
        }
        Err(err) => Err(err).with_context(|| {
            format!(
                "sweep halted after {} recorded slopes; adjust thresholds or add stages",
                results.len()
            )
        }),
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("❌ 오류: {:#}", e);
        process::exit(1);
    }
}
