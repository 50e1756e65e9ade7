//! Hebrew Matcher - template search over Hebrew word lists
//!
//! Main entry point for the command-line application.

use bytesize::ByteSize;
use clap::Parser;
use std::process;
use std::thread;

use hebrew_pattern_matcher::cli::{Args, SearchConfig};
use hebrew_pattern_matcher::loader::{LocatorFetcher, Source, WordlistLoader};
use hebrew_pattern_matcher::output::{render_matches, save_matches};
use hebrew_pattern_matcher::progress::{
    create_spinner, print_bullet, print_error, print_header, print_info, print_success,
    print_summary, print_warning, render_event,
};
use hebrew_pattern_matcher::session::{SearchEvent, SearchRequest, Searcher};
use hebrew_pattern_matcher::template::validate_template;

fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Set up logging
    if args.verbose {
        std::env::set_var("RUST_LOG", "debug");
    } else if !args.quiet {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    // Configure thread pool
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .ok();
    }

    // Run the application
    if let Err(e) = run(args) {
        print_error(&format!("{}", e));

        // Print chain of errors
        let mut source = e.source();
        while let Some(err) = source {
            print_error(&format!("  Caused by: {}", err));
            source = err.source();
        }

        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    validate_template(&args.pattern)?;

    let config = SearchConfig::from_args(&args)?;
    if config.verbose && !config.quiet {
        print_config(&config);
    }

    let loader = WordlistLoader::new(LocatorFetcher::new(), config.loader)
        .with_data_dir(&config.data_dir);
    let request = build_request(&config, &loader)?;
    let searcher = Searcher::new(loader);

    let (tx, rx) = crossbeam_channel::unbounded::<SearchEvent>();
    let spinner = if config.quiet {
        indicatif::ProgressBar::hidden()
    } else {
        create_spinner("Starting search...")
    };

    // Search on a worker thread; this thread only renders events. The
    // channel closes when the worker drops its sender.
    let run = thread::scope(|scope| {
        let worker = scope.spawn(move || searcher.run(&request, &tx));
        for event in rx.iter() {
            render_event(&spinner, &event);
        }
        worker.join()
    })
    .map_err(|_| anyhow::anyhow!("search thread panicked"))??;

    spinner.finish_and_clear();

    match config.output {
        Some(ref path) => {
            let written = save_matches(path, &run.matches, config.format)?;
            if !config.quiet {
                print_success(&format!(
                    "Wrote {} matches ({}) to {:?}",
                    written.lines,
                    ByteSize(written.bytes),
                    path
                ));
            }
        }
        None if !run.matches.is_empty() => println!("{}", render_matches(&run.matches, config.format)),
        None => {}
    }

    if !config.quiet {
        for (key, message) in run.failed_sources() {
            print_warning(&format!("{} unavailable: {}", key, message));
        }
        print_summary(&run);
    }

    Ok(())
}

/// Load the custom collections ahead of the run. Unlike built-in sources,
/// a failing download or file aborts.
fn build_request(
    config: &SearchConfig,
    loader: &WordlistLoader<LocatorFetcher>,
) -> anyhow::Result<SearchRequest> {
    let mut request = SearchRequest::new(config.pattern.clone());
    request.sources = config.sources.clone();
    request.paste = config.paste.clone();
    request.constraints = config.constraints.clone();
    request.options = config.search;

    for url in &config.urls {
        let collection = loader.download(url)?;
        if !config.quiet {
            print_info(&format!("Downloaded {} words from {}", collection.len(), collection.name));
        }
        request.custom.push(collection);
    }

    for path in &config.wordlists {
        request
            .custom
            .push(loader.load_collection(&Source::File(path.clone()))?);
    }

    request.validate()?;
    Ok(request)
}

/// Print configuration summary
fn print_config(config: &SearchConfig) {
    print_header("Configuration");

    print_info(&format!("Pattern:      {}", config.pattern));
    print_info(&format!("Sources:      {:?}", config.sources));
    print_info(&format!("Data dir:     {:?}", config.data_dir));
    for url in &config.urls {
        print_bullet(&format!("URL: {}", url));
    }
    for path in &config.wordlists {
        print_bullet(&format!("File: {:?}", path));
    }
    if let Some(ref constraints) = config.constraints {
        print_info(&format!("Required:     {:?}", constraints.required()));
        print_info(&format!("Forbidden:    {:?}", constraints.forbidden()));
    }
    print_info(&format!("Strip niqqud: {}", config.loader.strip_niqqud));
    print_info(&format!("Whole word:   {}", config.search.whole_word));
    print_info(&format!("Dedup:        {}", config.search.unique));
    print_info(&format!("Sort:         {}", config.search.sort));
}
