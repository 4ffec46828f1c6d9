use clap::Parser;

use gl_wrapper::logging::init_logging;

mod app;
mod args;

use app::App;
use args::ArgsInteractive;

fn main() {
    // clion needs help in trait annotation
    let args = <ArgsInteractive as Parser>::parse();

    if let Err(e) = init_logging(args.log.as_deref()) {
        eprintln!("Could not set up logging: {e}");
    }

    let app = match App::new(&args) {
        Ok(app) => app,
        Err(e) => {
            log::error!("Could not start: {e}");
            std::process::exit(-1);
        }
    };

    app.run();
}
