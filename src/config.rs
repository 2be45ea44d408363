use clap::{Parser, ValueEnum};

/// Command line options.
#[derive(Parser, Debug)]
#[command(name = "chip8vm", version, about = "Run a CHIP-8 program")]
pub struct Args {
    /// Where to show the display
    #[arg(long, value_enum, default_value_t = Ui::Terminal)]
    pub ui: Ui,

    /// How to read --data
    #[arg(long = "type", value_enum, default_value_t = DataType::File)]
    pub data_type: DataType,

    /// Path to a program file, or hex bytes like "60 05 61 08"
    #[arg(long)]
    pub data: String,

    /// Instructions per second
    #[arg(long, default_value_t = 500, value_parser = clap::value_parser!(u32).range(1..))]
    pub hz: u32,

    /// Fixed seed for RND
    #[arg(long)]
    pub seed: Option<u64>,

    /// Verbose logging, plus a state dump when the run ends
    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Ui {
    Terminal,
    Window,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DataType {
    File,
    Raw,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["chip8vm", "--data", "pong.ch8"]).unwrap();
        assert_eq!(args.ui, Ui::Terminal);
        assert_eq!(args.data_type, DataType::File);
        assert_eq!(args.data, "pong.ch8");
        assert_eq!(args.hz, 500);
        assert_eq!(args.seed, None);
        assert!(!args.debug);
    }

    #[test]
    fn raw_program_in_a_window() {
        let args = Args::try_parse_from([
            "chip8vm", "--ui", "window", "--type", "raw", "--data", "60 05 61 08", "--hz", "60",
            "--seed", "42", "--debug",
        ])
        .unwrap();
        assert_eq!(args.ui, Ui::Window);
        assert_eq!(args.data_type, DataType::Raw);
        assert_eq!(args.data, "60 05 61 08");
        assert_eq!(args.hz, 60);
        assert_eq!(args.seed, Some(42));
        assert!(args.debug);
    }

    #[test]
    fn data_is_required() {
        assert!(Args::try_parse_from(["chip8vm"]).is_err());
    }

    #[test]
    fn rejects_unknown_choices_and_zero_rate() {
        assert!(Args::try_parse_from(["chip8vm", "--data", "x", "--ui", "tv"]).is_err());
        assert!(Args::try_parse_from(["chip8vm", "--data", "x", "--type", "url"]).is_err());
        assert!(Args::try_parse_from(["chip8vm", "--data", "x", "--hz", "0"]).is_err());
    }
}
