use std::collections::HashMap;

pub fn collect_template_files(name: &str, template_str: &str) -> Option<HashMap<String, String>> {
    match template_str {
        "commented" => Some(template_commented(name)),
        "bare" => Some(template_bare()),
        _ => None,
    }
}

// commented template
fn template_commented(name: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert(
        avloc::CONFIG_FILE_NAME.to_string(),
        format!(
            r##"# job sweep: {name}

# directory holding the `macros`, `outputs` and `RATlogs` directories
base_dir = "."
# create those directories if they're missing
create_dirs = true

# every sensor is paired with every displacement
sensors = ["FT033A"]
# displacement values in mm
displacements = [0.0]
# file names use the displacement truncated to an integer ("truncate"),
# use "exact" to keep fractional values apart (1.7 -> 1p7)
disp_format = "truncate"

# events simulated by each job
events = 500
# jobs submitted per sensor and displacement
repetitions = 200

# templates; relative paths here and in `base_dir` start at this file's directory
macro_template = "AV_loc.mac"
script_template = "script.sh"

[submit]
# queue command, called as `<command> <args...> <script>`
command = "qsub"
args = []
# what to do when the queue command fails: "ignore", "warn" or "abort"
on_failure = "ignore"
"##,
            name = name,
        ),
    );
    map.extend(template_files());
    map
}

fn template_bare() -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert(
        avloc::CONFIG_FILE_NAME.to_string(),
        String::from(
            r##"create_dirs = true
sensors = ["FT033A"]
displacements = [0.0]
"##,
        ),
    );
    map.extend(template_files());
    map
}

// Macro and script templates.
//
// Placeholders: $Disp, $Number and $Events in the macro, $Macro, $Output
// and $Log in the script. `$$` is a literal dollar sign.
fn template_files() -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert(
        avloc::config::DEFAULT_MACRO_TEMPLATE.to_string(),
        String::from(
            r##"# AV location run: fibre $Number, AV offset $Disp mm, $Events events
/rat/db/set GEO[av] position_offset $Disp
/rat/db/set ELLIE fibre "$Number"

/run/initialize

/rat/proc frontend
/rat/proc trigger
/rat/proc eventbuilder
/rat/proc calibratePMT
/rat/proc count
/rat/procset update 100
/rat/proc outroot

/generator/add ellie
/rat/run/start $Events
exit
"##,
        ),
    );
    map.insert(
        avloc::config::DEFAULT_SCRIPT_TEMPLATE.to_string(),
        String::from(
            r##"#!/bin/bash
#PBS -l walltime=12:00:00
#PBS -j oe
#PBS -o $Log.pbs

source $$HOME/rat_env.sh
rat -o $Output.root -l $Log $Macro
"##,
        ),
    );
    map
}
