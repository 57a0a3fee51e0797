//! `vidprep shard`: packs an existing chunk tree into tar shards.

use crate::cli::ShardArgs;
use crate::error::CliResult;
use crate::terminal::{print_section, print_status, print_success, print_warning};

use vidprep_core::{OutputFormat, pack_shards};

pub fn run_shard(args: ShardArgs) -> CliResult<()> {
    let format: OutputFormat = args.format.parse()?;

    print_section("Sharding");
    print_status("Input", args.input_dir.display());
    print_status("Shards", args.shard_dir.display());
    print_status("Format", format);
    print_status("Shard size", args.shard_size);

    let shards = pack_shards(&args.input_dir, &args.shard_dir, args.shard_size, format)?;
    if shards == 0 {
        print_warning("No chunks found to pack");
    } else {
        print_success(&format!("{} shard(s) written", shards));
    }
    Ok(())
}
