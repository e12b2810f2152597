use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, Ident, ItemFn, ReturnType, Type};

/// Expands the `#[showroom_runtime::main]` attribute macro.
pub fn expand_main(args: TokenStream, input: ItemFn) -> TokenStream {
    expand(args, &input).unwrap_or_else(Error::into_compile_error)
}

fn expand(args: TokenStream, input: &ItemFn) -> syn::Result<TokenStream> {
    if input.sig.asyncness.is_none() {
        return Err(Error::new_spanned(
            &input.sig.ident,
            "#[showroom_runtime::main] can only be used on async functions",
        ));
    }

    if !returns_result(&input.sig.output) {
        return Err(Error::new_spanned(
            &input.sig.output,
            "#[showroom_runtime::main] requires a Result return type",
        ));
    }

    let profile = profile_call(args)?;
    let ItemFn { attrs, vis, sig, block } = input;
    let name = &sig.ident;
    let output = &sig.output;

    Ok(quote! {
        #(#attrs)*
        #vis fn #name() #output {
            let config = #profile;
            let rt = ::showroom_runtime::build_runtime_with_config(&config)?;
            rt.block_on(async #block)
        }
    })
}

fn profile_call(args: TokenStream) -> syn::Result<TokenStream> {
    if args.is_empty() {
        return Ok(quote! { ::showroom_runtime::RuntimeConfig::default() });
    }

    let profile: Ident = syn::parse2(args)?;
    match profile.to_string().as_str() {
        "high_performance" => Ok(quote! { ::showroom_runtime::RuntimeConfig::high_performance() }),
        "memory_efficient" => Ok(quote! { ::showroom_runtime::RuntimeConfig::memory_efficient() }),
        "default" => Ok(quote! { ::showroom_runtime::RuntimeConfig::default() }),
        _ => Err(Error::new_spanned(
            profile,
            "Unknown runtime profile. Use: high_performance, memory_efficient, or default",
        )),
    }
}

fn returns_result(output: &ReturnType) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };
    let Type::Path(path) = &**ty else {
        return false;
    };
    path.path.segments.last().is_some_and(|seg| seg.ident == "Result")
}
