use std::collections::BTreeMap;
use std::time::Instant;
use clap::Parser;

/// Fire a burst of concurrent requests and tally the status codes.
#[derive(Parser)]
#[command(name = "burst")]
#[command(about = "Exercise the rate limiter with concurrent requests", long_about = None)]
struct Cli {
    /// Target URL.
    #[arg(default_value = "http://localhost:8080/health")]
    url: String,

    /// Number of simultaneous requests.
    #[arg(short = 'n', long, default_value_t = 11)]
    requests: usize,

    /// Send this value as X-Forwarded-For.
    ///
    /// Only changes the rate-limit key when the server's `ip_lookups` list
    /// puts `X-Forwarded-For` before `RemoteAddr`. Under the default order the
    /// socket address always resolves first and the header is ignored.
    #[arg(long)]
    forwarded_for: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let start = Instant::now();

    let mut tasks = Vec::with_capacity(cli.requests);
    for _ in 0..cli.requests {
        let mut request = client.get(&cli.url);
        if let Some(ip) = &cli.forwarded_for {
            request = request.header("X-Forwarded-For", ip);
        }
        tasks.push(tokio::spawn(async move { request.send().await }));
    }

    let mut tally: BTreeMap<String, usize> = BTreeMap::new();
    for task in tasks {
        let key = match task.await? {
            Ok(res) => res.status().as_u16().to_string(),
            Err(e) => {
                eprintln!("Request failed: {}", e);
                "error".to_string()
            }
        };
        *tally.entry(key).or_default() += 1;
    }

    println!("{} requests to {} in {:?}", cli.requests, cli.url, start.elapsed());
    for (status, count) in &tally {
        println!("  {}: {}", status, count);
    }
    Ok(())
}
