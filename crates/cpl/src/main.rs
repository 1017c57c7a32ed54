fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = chrome_profile_launcher::parse_cli();
    match chrome_profile_launcher::run(&cli) {
        Ok(()) => Ok(()),
        Err(err) => {
            let exit_code = chrome_profile_launcher::exit_code_for_error(&err);
            chrome_profile_launcher::write_cli_error(&err, std::io::stderr().lock())?;
            std::process::exit(exit_code);
        }
    }
}
