use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};

use edgematch::engine::grid::BoardType;
use edgematch::engine::{run, RunOptions};
use edgematch::error::SolveError;
use edgematch::pieces::load_pieces;
use edgematch::validate;

/// Edge-matching puzzle solver.
///
/// Counts (or prints) every placement of the loaded pieces onto the board
/// with matching adjacent edges and zero-colored borders.
#[derive(Parser)]
#[command(name = "edgematch", version)]
// flag-per-option mirrors the solver's established command line
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Board width.
    bw: Option<u32>,

    /// Board height.
    bh: Option<u32>,

    /// File holding the puzzle pieces, one per line.
    pieces: Option<PathBuf>,

    /// Run the validation suite.
    #[arg(long)]
    validate: bool,

    /// Use 1x2 or 2x1 tiles and smaller.
    #[arg(long = "u2")]
    use2: bool,

    /// Use 2x2 tiles and smaller.
    #[arg(long = "u4")]
    use4: bool,

    /// Use 2x4 or 4x2 tiles and smaller.
    #[arg(long = "u8")]
    use8: bool,

    /// Use 4x4 tiles and smaller.
    #[arg(long = "u16")]
    use16: bool,

    /// Use 4x8 or 8x4 tiles and smaller.
    #[arg(long = "u32")]
    use32: bool,

    /// Solve a normal board (all edges are borders).
    #[arg(long = "bt0")]
    bt0: bool,

    /// Solve for bottom left corner only.
    #[arg(long = "bt1")]
    bt1: bool,

    /// Solve for bottom edge only.
    #[arg(long = "bt2")]
    bt2: bool,

    /// Solve for bottom right corner only.
    #[arg(long = "bt3")]
    bt3: bool,

    /// Solve for left edge only.
    #[arg(long = "bt4")]
    bt4: bool,

    /// Solve a board with no borders.
    #[arg(long = "bt5")]
    bt5: bool,

    /// Solve for right edge only.
    #[arg(long = "bt6")]
    bt6: bool,

    /// Solve for top left corner only.
    #[arg(long = "bt7")]
    bt7: bool,

    /// Solve for top edge only.
    #[arg(long = "bt8")]
    bt8: bool,

    /// Solve for top right corner only.
    #[arg(long = "bt9")]
    bt9: bool,

    /// Print solutions.
    #[arg(short = 'p')]
    print: bool,

    /// Quit after first solution found.
    #[arg(short = 'q')]
    quit: bool,

    /// Randomize tiles before solving.
    #[arg(short = 'r')]
    randomize: bool,

    /// Use threaded solving.
    #[arg(short = 't')]
    threaded: bool,
}

impl Cli {
    fn cell_cap(&self) -> u32 {
        if self.use2 {
            2
        } else if self.use4 {
            4
        } else if self.use8 {
            8
        } else if self.use16 {
            16
        } else if self.use32 {
            32
        } else {
            1
        }
    }

    /// Board types follow the numeric keypad: 1 is the bottom-left corner,
    /// 5 a board with no borders, 9 the top-right corner. The top row wins
    /// when several flags are given; `--bt0` is the normal board, same as
    /// passing nothing.
    fn board_type(&self) -> BoardType {
        let flags = [
            (self.bt7, BoardType::TopLeftCorner),
            (self.bt8, BoardType::TopEdge),
            (self.bt9, BoardType::TopRightCorner),
            (self.bt4, BoardType::LeftEdge),
            (self.bt5, BoardType::Middle),
            (self.bt6, BoardType::RightEdge),
            (self.bt1, BoardType::BottomLeftCorner),
            (self.bt2, BoardType::BottomEdge),
            (self.bt3, BoardType::BottomRightCorner),
            (self.bt0, BoardType::Normal),
        ];
        flags
            .into_iter()
            .find_map(|(set, ty)| set.then_some(ty))
            .unwrap_or(BoardType::Normal)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.validate {
        validate::run();
        return ExitCode::SUCCESS;
    }

    let (Some(bw), Some(bh), Some(path)) = (cli.bw, cli.bh, cli.pieces.as_deref()) else {
        Cli::command().print_help().ok();
        return ExitCode::SUCCESS;
    };

    if bw < 2 || bh < 2 {
        println!("{}", SolveError::InvalidBoardSize);
        return ExitCode::SUCCESS;
    }

    let pieces = match load_pieces(path) {
        Ok(pieces) if !pieces.is_empty() => pieces,
        _ => {
            println!("{}", SolveError::LoadFailed);
            return ExitCode::SUCCESS;
        }
    };
    println!("loaded {} pieces", pieces.len());

    let opts = RunOptions {
        print: cli.print,
        quit: cli.quit,
        randomize: cli.randomize,
        threaded: cli.threaded,
        board_type: cli.board_type(),
        cell_cap: cli.cell_cap(),
    };

    if let Err(err) = run(bw, bh, &pieces, &opts) {
        println!("{err}");
    }

    ExitCode::SUCCESS
}
