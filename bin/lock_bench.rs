use chrono::Duration;
use locklite::{HoldTable, LockTable, LockTableOptions, Reaper, ShardedLockTable};
use rand::distributions::Uniform;
use rand::Rng;
use rayon::prelude::*;
use std::sync::Arc;

const NUM_KEYS: usize = 100000;
const NUM_OPS: usize = 1000000;
const HOT_KEYS: usize = 16;

fn print_environment() {
    println!("locklite: version {}", env!("CARGO_PKG_VERSION"));

    let datetime = chrono::Utc::now();
    println!("Date: {:?}", datetime.naive_utc());
    println!("Threads: {}", rayon::current_num_threads());
}

fn print_arguments() {
    println!("Keys: {}", NUM_KEYS);
    println!("Operations: {}", NUM_OPS);
    println!("Hot keys: {}", HOT_KEYS);
}

struct BenchMark<T: HoldTable + 'static> {
    name: &'static str,
    table: Arc<T>,
    _reaper: Reaper,
}

impl<T: HoldTable + 'static> BenchMark<T> {
    fn new(name: &'static str, table: T) -> BenchMark<T> {
        let table = Arc::new(table);
        let options = LockTableOptions {
            reap_interval: std::time::Duration::from_millis(100),
            ..LockTableOptions::default()
        };
        let reaper = Reaper::start(table.clone(), &options).unwrap();
        BenchMark {
            name,
            table,
            _reaper: reaper,
        }
    }

    fn acquire_seq(&self) {
        let start = std::time::Instant::now();
        for i in 0..NUM_KEYS {
            self.table
                .acquire(&format!("seat{}", i), "bench", Duration::seconds(60))
                .unwrap();
        }
        let elapsed = start.elapsed().as_secs_f64();
        let left = self
            .table
            .info("seat0")
            .map(|hold| hold.remaining(chrono::Utc::now()).num_milliseconds())
            .unwrap_or(0);
        println!(
            "{} acquire_seq: {:.0} ops/s ({} holds, {} ms left on seat0)",
            self.name,
            NUM_KEYS as f64 / elapsed,
            self.table.len(),
            left
        );
    }

    fn is_held_random(&self) {
        let mut random = rand::thread_rng().sample_iter(Uniform::new(0, NUM_KEYS * 2));
        let mut held = 0;
        let start = std::time::Instant::now();
        for _ in 0..NUM_OPS {
            let i = random.next().unwrap();
            if self.table.is_held(&format!("seat{}", i)) {
                held += 1;
            }
        }
        let elapsed = start.elapsed().as_secs_f64();
        println!(
            "{} is_held_random: {:.0} ops/s ({} of {} held)",
            self.name,
            NUM_OPS as f64 / elapsed,
            held,
            NUM_OPS
        );
    }

    fn acquire_release_contended(&self) {
        let start = std::time::Instant::now();
        let granted = (0..NUM_OPS)
            .into_par_iter()
            .filter(|i| {
                let key = format!("hot{}", i % HOT_KEYS);
                let granted = self
                    .table
                    .acquire(&key, &format!("user{}", i), Duration::seconds(60))
                    .unwrap();
                if granted {
                    self.table.release_by(&key, &format!("user{}", i));
                }
                granted
            })
            .count();
        let elapsed = start.elapsed().as_secs_f64();
        println!(
            "{} acquire_release_contended: {:.0} ops/s ({} of {} granted)",
            self.name,
            NUM_OPS as f64 / elapsed,
            granted,
            NUM_OPS
        );
    }

    fn release_seq(&self) {
        let start = std::time::Instant::now();
        let mut released = 0;
        for i in 0..NUM_KEYS {
            if self.table.release(&format!("seat{}", i)) {
                released += 1;
            }
        }
        let elapsed = start.elapsed().as_secs_f64();
        println!(
            "{} release_seq: {:.0} ops/s ({} released)",
            self.name,
            NUM_KEYS as f64 / elapsed,
            released
        );
    }

    fn run(&self) {
        self.acquire_seq();
        self.is_held_random();
        self.acquire_release_contended();
        self.release_seq();
    }
}

fn main() {
    print_environment();
    print_arguments();

    println!("-------------------------------------------------");
    BenchMark::new("mutex", LockTable::new()).run();
    BenchMark::new("sharded", ShardedLockTable::new()).run();
}
