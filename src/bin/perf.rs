use log::info;
use rand::{prelude::random, rngs::SmallRng, Rng, SeedableRng};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use structopt::StructOpt;

use std::{thread, time};

use rbidx::Tree;

/// Command line options.
#[derive(Clone, StructOpt)]
pub struct Opt {
    #[structopt(long = "seed")]
    seed: Option<u64>,

    #[structopt(long = "loads", default_value = "1000000")] // default 1M
    loads: usize,

    #[structopt(long = "gets", default_value = "0")]
    gets: usize,

    #[structopt(long = "updates", default_value = "0")]
    updates: usize,

    #[structopt(long = "writers", default_value = "1")]
    writers: usize,

    #[structopt(long = "readers", default_value = "1")]
    readers: usize,

    #[structopt(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
}

fn main() {
    let opts = Opt::from_args();
    let config = Config::default();
    TermLogger::init(opts.log_level, config, TerminalMode::Mixed, ColorChoice::Auto).ok();

    let seed = opts.seed.unwrap_or_else(random);
    info!("perf seed {}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    let index: Tree<u64> = Tree::with_capacity(opts.loads);

    // initial load
    let start = time::Instant::now();
    let mut n_dups = 0;
    for _i in 0..opts.loads {
        let (key, val): (u64, u64) = (rng.gen(), rng.gen());
        if index.insert(key.to_be_bytes().to_vec(), val).is_err() {
            n_dups += 1;
        }
    }

    info!(
        "loaded {} items ({} duplicates) in {:?}, height {}",
        index.len(),
        n_dups,
        start.elapsed(),
        index.height()
    );

    let mut handles = vec![];
    for j in 0..opts.writers {
        let (mut opts, index) = (opts.clone(), index.clone());
        opts.gets = 0;
        let seed = seed.wrapping_add((j as u64) * 100);
        let h = thread::spawn(move || do_incremental(j, seed, opts, index));
        handles.push(h);
    }
    for j in opts.writers..(opts.writers + opts.readers) {
        let (mut opts, index) = (opts.clone(), index.clone());
        opts.loads = 0;
        opts.updates = 0;
        let seed = seed.wrapping_add((j as u64) * 100);
        let h = thread::spawn(move || do_incremental(j, seed, opts, index));
        handles.push(h);
    }

    for handle in handles.into_iter() {
        handle.join().ok();
    }

    match index.validate() {
        Ok(()) => info!("validated {} items", index.len()),
        Err(err) => log::error!("validate failed: {}", err),
    }
}

// writers insert fresh keys and update existing ones, readers only find.
fn do_incremental(j: usize, seed: u64, opts: Opt, index: Tree<u64>) {
    let mut rng = SmallRng::seed_from_u64(seed);

    let start = time::Instant::now();
    let (sets, total) = (opts.loads / 10, opts.loads / 10 + opts.updates + opts.gets);
    if total == 0 {
        return;
    }
    let mut n = total;
    while n > 0 {
        let op = rng.gen::<usize>() % total;

        let key = rng.gen::<u64>().to_be_bytes();
        if op < sets {
            index.insert(key.to_vec(), rng.gen()).ok();
        } else if op < (sets + opts.updates) {
            index.update(&key, rng.gen()).ok();
        } else {
            index.find(&key);
        }
        n -= 1;
    }
    info!(
        "incremental-{} for operations {}, took {:?}",
        j,
        total,
        start.elapsed()
    );

    let start = time::Instant::now();
    let mut n = 0;
    index.inorder(|_, _| n += 1);
    info!("inorder-{} for visiting {}, took {:?}", j, n, start.elapsed());
}
