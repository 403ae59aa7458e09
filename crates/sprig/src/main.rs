use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use sprig::{Binding, EvalOutcome, Interpreter, Value};

#[derive(Parser)]
#[command(name = "sprig", about = "Sprig: a small Clojure-flavored Lisp", version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// File to execute
    file: Option<String>,

    /// Evaluate an expression and print the result (if non-nil)
    #[arg(short, long)]
    eval: Option<String>,

    /// Suppress the REPL banner
    #[arg(short, long)]
    quiet: bool,

    /// Enter the REPL after running a file or expression
    #[arg(short, long)]
    interactive: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse source and display the AST
    Ast {
        /// File to parse
        file: Option<String>,

        /// Expression to parse
        #[arg(short, long)]
        eval: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = Cli::parse();

    if let Some(Commands::Ast { file, eval, json }) = cli.command {
        return run_ast(file, eval, json);
    }

    let interpreter = match Interpreter::new() {
        Ok(interp) => interp,
        Err(e) => {
            eprintln!("failed to load the standard library: {e}");
            return 1;
        }
    };

    if let Some(expr) = &cli.eval {
        match interpreter.evaluate(expr) {
            EvalOutcome::Success(val) => {
                if !val.is_nil() {
                    println!("{val}");
                }
            }
            failure => {
                print_failure(&failure);
                return 1;
            }
        }
        if cli.interactive {
            repl(interpreter, cli.quiet);
        }
        return 0;
    }

    if let Some(file) = &cli.file {
        match std::fs::read_to_string(file) {
            Ok(content) => {
                if let failure @ (EvalOutcome::ReadFailure(_) | EvalOutcome::EvalFailure(_)) =
                    interpreter.evaluate(&content)
                {
                    print_failure(&failure);
                    return 1;
                }
            }
            Err(e) => {
                eprintln!("error reading {file}: {e}");
                return 1;
            }
        }
        if cli.interactive {
            repl(interpreter, cli.quiet);
        }
        return 0;
    }

    repl(interpreter, cli.quiet);
    0
}

fn print_failure(outcome: &EvalOutcome) {
    match outcome {
        EvalOutcome::Success(_) => {}
        EvalOutcome::ReadFailure(e) => eprintln!("read error: {e}"),
        EvalOutcome::EvalFailure(e) => eprintln!("eval error: {e}"),
    }
}

fn run_ast(file: Option<String>, eval: Option<String>, json: bool) -> i32 {
    let source = match (&file, &eval) {
        (Some(path), None) => match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("error reading {path}: {e}");
                return 1;
            }
        },
        (None, Some(expr)) => expr.clone(),
        (Some(_), Some(_)) => {
            eprintln!("error: cannot specify both a file and --eval");
            return 1;
        }
        (None, None) => {
            eprintln!("error: provide a file or --eval expression");
            return 1;
        }
    };

    let forms = match sprig::read_many(&source) {
        Ok(forms) => forms,
        Err(e) => {
            eprintln!("parse error: {e}");
            return 1;
        }
    };

    if json {
        let ast: Vec<serde_json::Value> = forms.iter().map(value_to_json).collect();
        let output = if ast.len() == 1 {
            serde_json::to_string_pretty(&ast[0])
        } else {
            serde_json::to_string_pretty(&ast)
        };
        match output {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("error serializing AST: {e}");
                return 1;
            }
        }
    } else {
        for (i, form) in forms.iter().enumerate() {
            if i > 0 {
                println!();
            }
            print_ast(form, 0);
        }
    }
    0
}

fn value_to_json(val: &Value) -> serde_json::Value {
    use serde_json::json;
    match val {
        Value::Nil => json!({"type": "nil"}),
        Value::Bool(b) => json!({"type": "bool", "value": b}),
        Value::Int(n) => json!({"type": "int", "value": n}),
        Value::Float(f) => json!({"type": "float", "value": f}),
        Value::Char(c) => json!({"type": "char", "value": c.to_string()}),
        Value::Str(s) => json!({"type": "string", "value": &**s}),
        Value::Keyword(s) => json!({"type": "keyword", "value": sprig_core::resolve(*s)}),
        Value::Symbol(s) => json!({"type": "symbol", "value": sprig_core::resolve(*s)}),
        Value::Special(s) => json!({"type": "special", "value": s.name()}),
        Value::Builtin(b) => json!({"type": "builtin", "value": b.name()}),
        Value::Regex(r) => json!({"type": "regex", "value": r.as_str()}),
        Value::ReaderMacro(kind, inner) => json!({
            "type": "reader-macro",
            "prefix": kind.prefix(),
            "form": value_to_json(inner),
        }),
        Value::List(items) => json!({
            "type": "list",
            "children": items.iter().map(value_to_json).collect::<Vec<_>>(),
        }),
        Value::Vector(items) => json!({
            "type": "vector",
            "children": items.iter().map(value_to_json).collect::<Vec<_>>(),
        }),
        Value::Map(m) => json!({
            "type": "map",
            "entries": m
                .iter()
                .map(|(k, v)| json!({"key": value_to_json(k), "value": value_to_json(v)}))
                .collect::<Vec<_>>(),
        }),
        other => json!({"type": other.type_name()}),
    }
}

fn print_ast(val: &Value, indent: usize) {
    let pad = "  ".repeat(indent);
    match val {
        Value::List(items) => {
            println!("{pad}List");
            for item in items.iter() {
                print_ast(item, indent + 1);
            }
        }
        Value::Vector(items) => {
            println!("{pad}Vector");
            for item in items.iter() {
                print_ast(item, indent + 1);
            }
        }
        Value::Map(m) => {
            println!("{pad}Map");
            for (k, v) in m.iter() {
                println!("{pad}  Entry");
                print_ast(k, indent + 2);
                print_ast(v, indent + 2);
            }
        }
        Value::ReaderMacro(kind, inner) => {
            println!("{pad}ReaderMacro {}", kind.prefix());
            print_ast(inner, indent + 1);
        }
        other => println!("{pad}{other:?}"),
    }
}

fn repl(interpreter: Interpreter, quiet: bool) {
    let mut rl = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("failed to create line editor: {e}");
            return;
        }
    };
    let history_path = dirs_path().join("history.txt");
    let _ = rl.load_history(&history_path);

    if !quiet {
        println!(
            "Sprig v{} — a small Clojure-flavored Lisp",
            env!("CARGO_PKG_VERSION")
        );
        println!("Type ,help for help, ,quit to exit\n");
    }

    let mut buffer = String::new();
    let mut in_multiline = false;

    loop {
        let prompt = if in_multiline { "   ... " } else { "sprig> " };
        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if !in_multiline {
                    match trimmed {
                        ",quit" | ",exit" | ",q" => break,
                        ",help" | ",h" => {
                            print_help();
                            continue;
                        }
                        ",env" => {
                            print_env(&interpreter);
                            continue;
                        }
                        _ => {}
                    }
                }

                if in_multiline {
                    buffer.push('\n');
                    buffer.push_str(&line);
                } else {
                    buffer = line.clone();
                }

                if !is_balanced(&buffer) {
                    in_multiline = true;
                    continue;
                }

                in_multiline = false;
                let input = buffer.trim().to_string();
                buffer.clear();

                if input.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&input);

                match interpreter.evaluate(&input) {
                    EvalOutcome::Success(val) => {
                        if !val.is_nil() {
                            println!("{val}");
                        }
                    }
                    failure => print_failure(&failure),
                }
            }
            Err(ReadlineError::Interrupted) => {
                if in_multiline {
                    buffer.clear();
                    in_multiline = false;
                    println!("^C");
                    continue;
                }
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("error: {e}");
                break;
            }
        }
    }

    let _ = std::fs::create_dir_all(dirs_path());
    let _ = rl.save_history(&history_path);
}

/// Are the line's delimiters balanced enough to submit?
fn is_balanced(input: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape = false;
    for ch in input.chars() {
        if escape {
            escape = false;
            continue;
        }
        if ch == '\\' {
            escape = true;
            continue;
        }
        if ch == '"' {
            in_string = !in_string;
            continue;
        }
        if in_string {
            continue;
        }
        if ch == ';' {
            break;
        }
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ => {}
        }
    }
    depth <= 0 && !in_string
}

fn print_help() {
    println!("Sprig REPL commands:");
    println!("  ,quit / ,q    Exit the REPL");
    println!("  ,help / ,h    Show this help");
    println!("  ,env          Show global bindings");
    println!();
    println!("Core forms:");
    println!("  def, fn, defn, defmacro, if, do, let, loop/recur");
    println!("  quote ('), syntax-quote (`), unquote (~), splice (~@)");
}

fn print_env(interpreter: &Interpreter) {
    let env = interpreter.global_env();
    let bindings = env.bindings.borrow();
    let mut names: Vec<_> = bindings
        .iter()
        .map(|(spur, binding)| (sprig_core::resolve(*spur), binding.clone()))
        .collect();
    names.sort_by(|a, b| a.0.cmp(&b.0));
    if names.is_empty() {
        println!("(no global bindings)");
        return;
    }
    for (name, binding) in names {
        match binding {
            Binding::Bound(val) => println!("  {name} = {val}"),
            Binding::MacroDef(m) => println!("  {name} = {}", Value::Macro(m)),
            Binding::Unbound => println!("  {name} = #<unbound>"),
        }
    }
}

fn dirs_path() -> std::path::PathBuf {
    std::env::var("HOME")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("."))
        .join(".sprig")
}
