//! Procedural macros for runwith.
//!
//! - `#[runwith::entry]` adds an `Entry` constant next to a function
//! - `#[runwith::remote(runner)]` turns a function into one that runs its
//!   body through `runner`
//! - `#[runwith::interpreter(path)]` and `#[runwith::slurm(options, template)]`
//!   are shorthands for `remote`

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::parse::{Parse, ParseStream};
use syn::{Expr, FnArg, Ident, ItemFn, LitStr, Pat, ReturnType, Token, Type, parse_macro_input};

/// Marks a function as an entry point.
///
/// The function is kept as written. Next to it an upper-case constant of
/// type `runwith::Entry<(Args,..), Ret>` is generated, to be registered in
/// a worker's `Registry` and wrapped by a decorator.
///
/// ```rust,ignore
/// #[runwith::entry]
/// pub fn add(a: i64, b: i64) -> i64 {
///     a + b
/// }
///
/// let registry = Registry::new().with(ADD);
/// let sum = runwith::interpreter("/opt/worker").wrap(ADD).call((1, 2))?;
/// ```
///
/// The entry name defaults to `module_path!()::fn_name`; pass
/// `name = "..."` to choose a stable name instead.
#[proc_macro_attribute]
pub fn entry(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as MacroArgs);
    let input = parse_macro_input!(item as ItemFn);

    let result = args
        .expect_exprs(0, "entry")
        .and_then(|_| expand_entry(&input, args.name.as_ref()));
    into_output(result)
}

/// Runs the function's body through a runner instead of in-process.
///
/// The argument is any expression evaluating to a runner
/// (`runwith::interpreter(..)`, `runwith::slurm(..)?`, ...). The function
/// keeps its parameters but returns `runwith::Result<Ret>`; the original
/// body becomes the generated entry constant, callable locally with
/// `ENTRY.invoke(args)`.
///
/// ```rust,ignore
/// #[runwith::remote(runwith::interpreter("/opt/worker"))]
/// pub fn answer() -> bool {
///     true
/// }
///
/// assert_eq!(answer()?, ANSWER.invoke(()));
/// ```
#[proc_macro_attribute]
pub fn remote(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as MacroArgs);
    let input = parse_macro_input!(item as ItemFn);

    let result = args.expect_exprs(1, "remote").and_then(|_| {
        let runner = &args.exprs[0];
        expand_remote(&input, args.name.as_ref(), quote! { #runner })
    });
    into_output(result)
}

/// Shorthand for `#[remote(runwith::interpreter(path))]`.
#[proc_macro_attribute]
pub fn interpreter(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as MacroArgs);
    let input = parse_macro_input!(item as ItemFn);

    let result = args.expect_exprs(1, "interpreter").and_then(|_| {
        let path = &args.exprs[0];
        expand_remote(
            &input,
            args.name.as_ref(),
            quote! { ::runwith::interpreter(#path) },
        )
    });
    into_output(result)
}

/// Shorthand for `#[remote(runwith::slurm(options, template)?)]`.
///
/// A template without `{target}` fails when the function is called.
#[proc_macro_attribute]
pub fn slurm(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as MacroArgs);
    let input = parse_macro_input!(item as ItemFn);

    let result = args.expect_exprs(2, "slurm").and_then(|_| {
        let options = &args.exprs[0];
        let template = &args.exprs[1];
        expand_remote(
            &input,
            args.name.as_ref(),
            quote! { ::runwith::slurm(#options, #template)? },
        )
    });
    into_output(result)
}

fn into_output(result: syn::Result<TokenStream2>) -> TokenStream {
    match result {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Positional expressions plus an optional `name = "..."`.
struct MacroArgs {
    exprs: Vec<Expr>,
    name: Option<LitStr>,
}

impl Parse for MacroArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut exprs = Vec::new();
        let mut name = None;

        while !input.is_empty() {
            if input.peek(Ident) && input.peek2(Token![=]) && !input.peek2(Token![==]) {
                let key: Ident = input.parse()?;
                if key != "name" {
                    return Err(syn::Error::new(key.span(), "unknown option, expected `name`"));
                }
                input.parse::<Token![=]>()?;
                name = Some(input.parse::<LitStr>()?);
            } else {
                exprs.push(input.parse::<Expr>()?);
            }

            if input.is_empty() {
                break;
            }
            input.parse::<Token![,]>()?;
        }

        Ok(Self { exprs, name })
    }
}

impl MacroArgs {
    fn expect_exprs(&self, count: usize, macro_name: &str) -> syn::Result<()> {
        if self.exprs.len() == count {
            return Ok(());
        }
        let expected = match macro_name {
            "remote" => "#[remote(<runner>)]",
            "interpreter" => "#[interpreter(<path>)]",
            "slurm" => "#[slurm(<options>, <template>)]",
            _ => "#[entry] or #[entry(name = \"...\")]",
        };
        Err(syn::Error::new(
            Span::call_site(),
            format!("expected {}, got {} argument(s)", expected, self.exprs.len()),
        ))
    }
}

/// What the expansions need to know about an entry function.
struct Signature {
    /// Identifiers used to pass each argument on.
    idents: Vec<Ident>,
    types: Vec<Type>,
    ret: Type,
    entry_const: Ident,
}

fn analyze(input: &ItemFn) -> syn::Result<Signature> {
    let sig = &input.sig;

    if !sig.generics.params.is_empty() || sig.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "entry functions cannot be generic",
        ));
    }
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "entry functions cannot be async",
        ));
    }

    let mut idents = Vec::new();
    let mut types = Vec::new();
    for (index, arg) in sig.inputs.iter().enumerate() {
        let typed = match arg {
            FnArg::Typed(typed) => typed,
            FnArg::Receiver(receiver) => {
                return Err(syn::Error::new_spanned(
                    receiver,
                    "entry functions cannot take self",
                ));
            }
        };
        reject_borrowed(&typed.ty, "entry arguments must be owned")?;

        let ident = match typed.pat.as_ref() {
            Pat::Ident(pat) if pat.subpat.is_none() && pat.by_ref.is_none() => pat.ident.clone(),
            _ => format_ident!("__arg{}", index),
        };
        idents.push(ident);
        types.push((*typed.ty).clone());
    }

    let ret: Type = match &sig.output {
        ReturnType::Default => syn::parse_quote!(()),
        ReturnType::Type(_, ty) => {
            reject_borrowed(ty, "entry return values must be owned")?;
            (**ty).clone()
        }
    };

    let entry_const = const_name(&sig.ident);
    if entry_const == sig.ident {
        return Err(syn::Error::new_spanned(
            &sig.ident,
            "entry functions need a lower-case name; the upper-case name is used for the entry constant",
        ));
    }

    Ok(Signature {
        idents,
        types,
        ret,
        entry_const,
    })
}

fn reject_borrowed(ty: &Type, message: &str) -> syn::Result<()> {
    match ty {
        Type::Reference(_) => Err(syn::Error::new_spanned(ty, message)),
        Type::ImplTrait(_) => Err(syn::Error::new_spanned(ty, "entry types must be concrete")),
        _ => Ok(()),
    }
}

fn const_name(ident: &Ident) -> Ident {
    let upper = ident.to_string().trim_start_matches("r#").to_uppercase();
    Ident::new(&upper, ident.span())
}

fn entry_name(ident: &Ident, name: Option<&LitStr>) -> TokenStream2 {
    match name {
        Some(name) => quote! { #name },
        None => quote! { ::core::concat!(::core::module_path!(), "::", ::core::stringify!(#ident)) },
    }
}

/// The `Entry` constant that forwards to `target`.
fn entry_const(
    input: &ItemFn,
    signature: &Signature,
    name: Option<&LitStr>,
    target: &Ident,
) -> TokenStream2 {
    let vis = &input.vis;
    let fn_ident = &input.sig.ident;
    let Signature {
        idents,
        types,
        ret,
        entry_const,
    } = signature;
    let name = entry_name(fn_ident, name);
    let doc = format!("Entry point for [`{}`].", fn_ident);

    quote! {
        #[doc = #doc]
        #[allow(dead_code)]
        #vis const #entry_const: ::runwith::Entry<(#(#types,)*), #ret> = ::runwith::Entry::new(
            #name,
            |(#(#idents,)*): (#(#types,)*)| -> #ret { #target(#(#idents),*) },
        );
    }
}

fn expand_entry(input: &ItemFn, name: Option<&LitStr>) -> syn::Result<TokenStream2> {
    let signature = analyze(input)?;
    let constant = entry_const(input, &signature, name, &input.sig.ident);

    Ok(quote! {
        #input
        #constant
    })
}

fn expand_remote(
    input: &ItemFn,
    name: Option<&LitStr>,
    runner: TokenStream2,
) -> syn::Result<TokenStream2> {
    let signature = analyze(input)?;
    let fn_ident = &input.sig.ident;
    let local_ident = format_ident!("__runwith_local_{}", fn_ident);

    // The original body lives on under a hidden name.
    let mut local = input.clone();
    local.sig.ident = local_ident.clone();
    local.vis = syn::Visibility::Inherited;
    local.attrs.retain(|attr| !attr.path().is_ident("doc"));

    let constant = entry_const(input, &signature, name, &local_ident);

    let vis = &input.vis;
    let docs = input.attrs.iter().filter(|attr| attr.path().is_ident("doc"));
    let Signature {
        idents,
        types,
        ret,
        entry_const,
        ..
    } = &signature;

    Ok(quote! {
        #[doc(hidden)]
        #local

        #constant

        #(#docs)*
        #vis fn #fn_ident(#(#idents: #types),*) -> ::runwith::Result<#ret> {
            let __runner = #runner;
            ::runwith::Decorator::wrap(&__runner, #entry_const).call((#(#idents,)*))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_fn(source: &str) -> ItemFn {
        syn::parse_str(source).unwrap()
    }

    #[test]
    fn test_args_with_name() {
        let args: MacroArgs = syn::parse_str(r#"runwith::interpreter("/bin/w"), name = "math.add""#).unwrap();
        assert_eq!(args.exprs.len(), 1);
        assert_eq!(args.name.unwrap().value(), "math.add");
    }

    #[test]
    fn test_args_unknown_option() {
        let err = syn::parse_str::<MacroArgs>(r#"label = "x""#).err().unwrap();
        assert!(err.to_string().contains("unknown option"));
    }

    #[test]
    fn test_analyze_signature() {
        let sig = analyze(&parse_fn("fn add(a: i64, (b, c): (i64, i64)) -> i64 { a + b + c }")).unwrap();
        assert_eq!(sig.idents[0], "a");
        assert_eq!(sig.idents[1], "__arg1");
        assert_eq!(sig.entry_const, "ADD");
    }

    #[test]
    fn test_analyze_rejects() {
        for source in [
            "fn f<T>(x: T) -> T { x }",
            "async fn f() {}",
            "fn f(x: &str) {}",
            "fn f() -> &'static str { \"\" }",
            "fn f() -> impl Sized { 1 }",
            "fn F() {}",
        ] {
            assert!(analyze(&parse_fn(source)).is_err(), "{source}");
        }
    }

    #[test]
    fn test_remote_expansion_mentions_local_body() {
        let input = parse_fn("/// Says yes.\npub fn answer() -> bool { true }");
        let tokens = expand_remote(&input, None, quote! { runner() }).unwrap().to_string();
        assert!(tokens.contains("__runwith_local_answer"));
        assert!(tokens.contains("const ANSWER"));
        assert!(tokens.contains(":: runwith :: Result < bool >"));
    }
}
